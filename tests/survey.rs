use std::{
    fs,
    sync::{Arc, Mutex},
};

use cellgrab::{
    input::{self, Format},
    permission::Grants,
    projector::TableProjector,
    source::{ChannelSource, ReplaySource},
    CellTower, Session, SessionObserver, SessionState, Status,
};

#[derive(Default)]
struct Statuses(Mutex<Vec<Status>>);

impl SessionObserver for Statuses {
    fn snapshot_changed(&self, _: &[CellTower]) {}

    fn status(&self, status: Status) {
        self.0.lock().unwrap().push(status);
    }
}

const RECORDING: &str = r#"[{"type":"lte","mcc":"310","mnc":"260","tac":1000,"ci":5000},{"type":"lte","mcc":"310","mnc":"260","tac":65535,"ci":5001}]
[{"type":"gsm","mcc":"262","mnc":"01","lac":2000,"cid":6000},{"type":"wcdma","mcc":"262","mnc":"01","lac":1,"cid":1}]
[]
[{"type":"lte","mcc":"310","mnc":"260","tac":1000,"ci":5000},{"type":"gsm","mcc":null,"mnc":"01","lac":3000,"cid":7000}]
"#;

#[test]
fn replayed_survey() {
    let batches = input::read(RECORDING.as_bytes(), Format::JsonLines).unwrap();
    let statuses = Arc::new(Statuses::default());
    let session = Session::new(ReplaySource::new(batches), Grants::all(), statuses.clone());

    session.start().unwrap();
    for _ in 0..3 {
        session.refresh().unwrap();
    }

    assert_eq!(session.state(), SessionState::Collecting);
    assert_eq!(
        session.snapshot(),
        [
            CellTower::new(310, 260, 1000, 5000),
            CellTower::new(262, 1, 2000, 6000),
        ]
    );
    assert_eq!(*statuses.0.lock().unwrap(), [Status::NoCellInfoAvailable]);

    let dir = tempfile::tempdir().unwrap();
    let path = session.save(dir.path()).unwrap();
    assert_eq!(
        fs::read_to_string(path).unwrap(),
        "1. MCC: 310, MNC: 260, LAC: 1000, CID: 5000\n\
         2. MCC: 262, MNC: 1, LAC: 2000, CID: 6000\n"
    );
}

#[test]
fn table_follows_store() {
    let batches = input::read(RECORDING.as_bytes(), Format::JsonLines).unwrap();
    let projector = Arc::new(TableProjector::new(Vec::new()));
    let session = Session::new(ReplaySource::new(batches), Grants::all(), projector.clone());

    session.start().unwrap();
    session.clear();
    drop(session);

    let projector = Arc::try_unwrap(projector).ok().unwrap();
    let out = String::from_utf8(projector.into_inner()).unwrap();
    assert_eq!(
        out,
        "#  MCC  MNC   LAC   CID\n\
         1  310  260  1000  5000\n\
         #  MCC  MNC  LAC  CID\n"
    );
}

#[test]
fn denied_before_collection() {
    let batches = input::read(RECORDING.as_bytes(), Format::JsonLines).unwrap();
    let grants = Grants {
        fine_location: false,
        coarse_location: false,
        ..Grants::all()
    };
    let session = Session::new(
        ReplaySource::new(batches),
        grants,
        Arc::new(Statuses::default()),
    );

    assert_eq!(session.start(), Err(Status::PermissionsDenied));
    assert_eq!(session.source().remaining(), 4);
    assert!(session.is_empty());
}

#[tokio::test]
async fn pushed_batches() {
    let (source, tx) = ChannelSource::new(8);
    let statuses = Arc::new(Statuses::default());
    let session = Session::new(source, Grants::all(), statuses.clone());
    session.start().unwrap();

    let batches = input::read(RECORDING.as_bytes(), Format::JsonLines).unwrap();
    for batch in batches {
        tx.send(batch).await.unwrap();
    }
    drop(tx);
    session.source().closed().await;

    assert_eq!(session.len(), 2);
    assert_eq!(*statuses.0.lock().unwrap(), [Status::NoCellInfoAvailable]);

    // push sources accept refreshes without delivering anything
    session.refresh().unwrap();
    assert_eq!(session.len(), 2);
}

#[test]
fn empty_batch_leaves_store() {
    let csv = "batch,radio,mcc,mnc,area,cell\n1,lte,310,260,1000,5000\n";
    let mut batches = input::read(csv.as_bytes(), Format::Csv).unwrap();
    batches.push(Vec::new());

    let statuses = Arc::new(Statuses::default());
    let session = Session::new(ReplaySource::new(batches), Grants::all(), statuses.clone());
    session.start().unwrap();
    session.refresh().unwrap();

    assert_eq!(session.snapshot(), [CellTower::new(310, 260, 1000, 5000)]);
    assert_eq!(*statuses.0.lock().unwrap(), [Status::NoCellInfoAvailable]);
}

#[test]
fn unconfigured_permissions_deny() {
    let batches = input::read(RECORDING.as_bytes(), Format::JsonLines).unwrap();
    let statuses = Arc::new(Statuses::default());
    let session = Session::new(ReplaySource::new(batches), Grants::default(), statuses);

    assert_eq!(session.start(), Err(Status::PermissionsDenied));
    for _ in 0..3 {
        session.refresh().unwrap();
    }
    assert!(session.is_empty());
    assert_eq!(session.source().remaining(), 4);
}

#[tokio::test]
async fn listen_skips_malformed_lines() {
    let (source, tx) = ChannelSource::new(8);
    let session = Session::new(source, Grants::all(), Arc::new(Statuses::default()));
    session.start().unwrap();

    let data = "[{\"type\":\"lte\",\"mcc\":\"310\",\"mnc\":\"260\",\"tac\":1000,\"ci\":5000}]\n\
                not json\n\
                [{\"type\":\"gsm\",\"mcc\":\"262\",\"mnc\":\"01\",\"lac\":2000,\"cid\":6000}]\n";
    let forwarded = input::forward_json_lines(data.as_bytes(), tx).await.unwrap();
    session.source().closed().await;

    assert_eq!(forwarded, 2);
    assert_eq!(session.len(), 2);
}
