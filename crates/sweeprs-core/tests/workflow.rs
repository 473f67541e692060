use std::fs;
use sweeprs_core::{
    import_file, EntryId, ExportError, ExportOptions, ImportError, ReviewSession, Status,
};
use tempfile::TempDir;

const EXPORT: &str = "name,url,username,password,note,date_last_used\n\
    github,https://github.com/login,alice,correct-Horse-42!,,2024-03-01\n\
    github-work,https://www.GitHub.com,alice.work,hunter2,work,2024-05-01\n\
    bank,https://bank.example/secure?session=1,alice,hunter2,,\n\
    router,,admin,admin,,\n\
    shop,http://shop.example.net,alice,Tr0ub4dor&3x,,2023-12-24\n";

fn write_export(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("passwords.csv");
    fs::write(&path, EXPORT).unwrap();
    path
}

#[test]
fn review_and_export_round_trip() {
    let dir = TempDir::new().unwrap();
    let mut session = ReviewSession::open(write_export(&dir)).unwrap();

    let domains: Vec<_> = session.groups().iter().map(|g| g.domain.as_str()).collect();
    assert_eq!(domains, ["github.com", "bank.example", "shop.example.net"]);
    assert_eq!(session.group("github.com").unwrap().entries, [EntryId(1), EntryId(0)]);
    assert_eq!(session.unresolved(), [EntryId(3)]);

    let analysis = session.analysis();
    assert_eq!(analysis.total, 5);
    assert_eq!(analysis.unique_passwords, 4);
    assert_eq!(analysis.reused.len(), 1);
    assert_eq!(analysis.reused[0].entries, [EntryId(2), EntryId(1)]);
    assert!(analysis.is_weak(EntryId(1)));
    assert!(analysis.is_weak(EntryId(3)));

    session.set_statuses(&analysis.reused[0].entries, Status::Delete).unwrap();
    session.set_status(EntryId(0), Status::Keep).unwrap();

    let output = dir.path().join("cleaned.csv");
    session.write_export(&output, &ExportOptions::default()).unwrap();

    let written = fs::read_to_string(&output).unwrap();
    assert!(written.starts_with("name,url,username,password,note,date_last_used,status\r\n"));

    let reimported = import_file(&output).unwrap();
    let names: Vec<_> = reimported.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["github", "shop", "router"]);
    assert!(reimported.iter().all(|e| e.status == Status::Review));
    assert_eq!(reimported[0].password, "correct-Horse-42!");
    assert_eq!(reimported[0].time_last_used.as_deref(), Some("2024-03-01"));
}

#[test]
fn stripped_export_reimports_to_the_same_rows() {
    let dir = TempDir::new().unwrap();
    let session = ReviewSession::open(write_export(&dir)).unwrap();
    let options = ExportOptions { include_status: false };

    let first = session.export_csv(&options).unwrap();
    let again = ReviewSession::from_csv(first.as_bytes()).unwrap();
    assert_eq!(again.export_csv(&options).unwrap(), first);
}

#[test]
fn export_to_missing_directory_fails_without_side_effects() {
    let dir = TempDir::new().unwrap();
    let session = ReviewSession::open(write_export(&dir)).unwrap();
    let target = dir.path().join("missing").join("out.csv");

    let result = session.write_export(&target, &ExportOptions::default());
    assert!(matches!(result, Err(ExportError::Io { .. })));
    assert!(!target.exists());
}

#[test]
fn unreadable_import_loads_nothing() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.csv");
    let mut data = b"url,username,password\nhttps://a.com,u,p\nhttps://b.com,u,".to_vec();
    data.push(0xff);
    fs::write(&path, data).unwrap();

    assert!(matches!(ReviewSession::open(&path), Err(ImportError::Csv(_))));
    assert!(matches!(
        ReviewSession::open(dir.path().join("absent.csv")),
        Err(ImportError::Io { .. })
    ));
}
