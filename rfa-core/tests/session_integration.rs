//! Integration tests driving sessions through the line dispatcher against a
//! durable workspace in a temporary directory.

use std::fs;
use std::path::Path;

use rfa_core::{ServerConfig, Session, Workspace};

fn config(dir: &Path) -> ServerConfig {
    ServerConfig {
        sandbox_root: dir.join("Root"),
        state_dir: dir.join("AccessSession"),
        ..ServerConfig::default()
    }
}

fn open(dir: &Path) -> (ServerConfig, Workspace) {
    let config = config(dir);
    let ws = Workspace::open(&config).expect("Failed to open workspace");
    (config, ws)
}

/// Send a line and expect a reply.
fn send(session: &mut Session, line: &str) -> String {
    session
        .handle_line(line)
        .unwrap_or_else(|| panic!("no reply for {:?}", line))
}

fn login(session: &mut Session, user: &str, password: &str) {
    send(session, &format!("register {} {}", user, password));
    let reply = send(session, &format!("login {} {}", user, password));
    assert!(reply.starts_with("Success!"), "login failed: {}", reply);
}

#[test]
fn test_register_twice_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let (config, ws) = open(tmp.path());
    let mut s = Session::new(ws);

    assert_eq!(send(&mut s, "register test1 17bfdsbgl"), "Success! Registered test1");
    assert_eq!(
        send(&mut s, "register test1 another-password"),
        "Username test1 not available"
    );
    assert!(config.sandbox_root.join("test1").is_dir());
}

#[test]
fn test_weak_password() {
    let tmp = tempfile::tempdir().unwrap();
    let (config, ws) = open(tmp.path());
    let mut s = Session::new(ws);

    assert_eq!(
        send(&mut s, "register test2 hdfgh"),
        "Password length should be at least 8 characters"
    );
    assert!(!config.sandbox_root.join("test2").exists());
    assert_eq!(send(&mut s, "register test2 12345678"), "Success! Registered test2");
}

#[test]
fn test_login_failures() {
    let tmp = tempfile::tempdir().unwrap();
    let (_config, ws) = open(tmp.path());
    let mut s = Session::new(ws);

    assert_eq!(
        send(&mut s, "login ghost password1"),
        "You haven't registered! command: register <username> <password>"
    );

    send(&mut s, "register test4 jsdlghosd");
    assert_eq!(
        send(&mut s, "login test4 jsdlgholgegl"),
        "Sorry, the password you entered is wrong. Please try again"
    );
    assert!(!s.is_logged_in());

    assert_eq!(
        send(&mut s, "login test4 jsdlghosd"),
        "Success! test4 logged into the system"
    );
    assert_eq!(s.current_path().to_string(), "/test4");
    assert_eq!(send(&mut s, "login test4 jsdlghosd"), "Already logged in");
}

#[test]
fn test_commands_before_login_have_no_effect() {
    let tmp = tempfile::tempdir().unwrap();
    let (config, ws) = open(tmp.path());
    let mut s = Session::new(ws);

    for line in [
        "create_folder movies",
        "change_folder movies",
        "write_file k.txt Hello",
        "read_file k.txt",
        "list",
        "quit",
    ] {
        assert_eq!(send(&mut s, line), "Login to continue", "{}", line);
    }

    let entries: Vec<_> = fs::read_dir(&config.sandbox_root).unwrap().collect();
    assert!(entries.is_empty());
    assert!(send(&mut s, "commands").contains("register <username> <password>"));
}

#[test]
fn test_folders() {
    let tmp = tempfile::tempdir().unwrap();
    let (config, ws) = open(tmp.path());
    let mut s = Session::new(ws);
    login(&mut s, "test8", "rgglherglse9421-4");

    assert_eq!(
        send(&mut s, "change_folder .."),
        "Cannot move back from test8 root folder"
    );
    assert_eq!(send(&mut s, "create_folder movies"), "Successfully created folder movies");
    assert_eq!(
        send(&mut s, "create_folder movies"),
        "The folder movies already exists"
    );
    assert_eq!(
        send(&mut s, "change_folder movies"),
        "Successfully moved to folder /test8/movies"
    );
    assert_eq!(send(&mut s, "change_folder .."), "Successfully moved to folder /test8");
    assert_eq!(send(&mut s, "change_folder series"), "No such folder series exists");
    assert!(config.sandbox_root.join("test8/movies").is_dir());
}

#[test]
fn test_write_then_append() {
    let tmp = tempfile::tempdir().unwrap();
    let (config, ws) = open(tmp.path());
    let mut s = Session::new(ws);
    login(&mut s, "test9", "nlndgsvns");

    assert_eq!(
        send(&mut s, "write_file k.txt Hello World"),
        "Created and written data to file k.txt"
    );
    assert_eq!(
        send(&mut s, "write_file k.txt Hello Second World"),
        "Appended data to file k.txt"
    );

    let content = fs::read_to_string(config.sandbox_root.join("test9/k.txt")).unwrap();
    assert_eq!(content, "Hello WorldHello Second World");
}

#[test]
fn test_read_file_pagination() {
    let tmp = tempfile::tempdir().unwrap();
    let (_config, ws) = open(tmp.path());
    let mut s = Session::new(ws);
    login(&mut s, "test10", "brsgvegveiotyq39ty");

    send(&mut s, "write_file z.txt Hello World!n");
    assert_eq!(
        send(&mut s, "read_file z.txt"),
        "Reading file from 0 bytes to 13 bytes\nHello World!n"
    );

    // 230 bytes -> 3 pages
    let body = "x".repeat(230);
    send(&mut s, &format!("write_file long.txt {}", body));
    let first = send(&mut s, "read_file long.txt");
    assert!(first.starts_with("Reading file from 0 bytes to 100 bytes\n"));
    assert!(send(&mut s, "read_file long.txt").starts_with("Reading file from 100 bytes to 200 bytes\n"));
    assert!(send(&mut s, "read_file long.txt").starts_with("Reading file from 200 bytes to 230 bytes\n"));
    assert_eq!(send(&mut s, "read_file long.txt"), first);

    assert_eq!(send(&mut s, "read_file abc.txt"), "No such file abc.txt exists");
}

#[test]
fn test_list() {
    let tmp = tempfile::tempdir().unwrap();
    let (_config, ws) = open(tmp.path());
    let mut s = Session::new(ws);
    login(&mut s, "lister", "password123");

    send(&mut s, "create_folder movies");
    send(&mut s, "write_file a.txt abc");

    let listing = send(&mut s, "list");
    let lines: Vec<&str> = listing.lines().collect();
    assert_eq!(lines[0], "File | Size | Modified Date");
    assert!(lines[2].starts_with("a.txt | 3 | "), "{}", listing);
    assert!(lines[4].starts_with("movies/ | "), "{}", listing);
}

#[test]
fn test_list_after_folder_removed() {
    let tmp = tempfile::tempdir().unwrap();
    let (config, ws) = open(tmp.path());
    let mut s = Session::new(ws);
    login(&mut s, "lister", "password123");

    send(&mut s, "create_folder tmp");
    send(&mut s, "change_folder tmp");
    fs::remove_dir(config.sandbox_root.join("lister/tmp")).unwrap();

    assert_eq!(send(&mut s, "list"), "Not a directory: /lister/tmp");
}

#[test]
fn test_malformed_and_unknown() {
    let tmp = tempfile::tempdir().unwrap();
    let (_config, ws) = open(tmp.path());
    let mut s = Session::new(ws);

    assert_eq!(
        send(&mut s, "register onlyname"),
        "Enter correct command: register <username> <password>"
    );
    assert_eq!(
        send(&mut s, "create_folder a b"),
        "Enter correct command: create_folder <name>"
    );
    assert_eq!(s.handle_line("dance"), None);
}

#[test]
fn test_second_session_and_logout_keep_other_users() {
    let tmp = tempfile::tempdir().unwrap();
    let (_config, ws) = open(tmp.path());

    let mut alice = Session::new(ws.clone());
    let mut bob = Session::new(ws.clone());
    login(&mut alice, "alice", "password-a");
    login(&mut bob, "bob", "password-b");

    let mut alice2 = Session::new(ws.clone());
    assert_eq!(
        send(&mut alice2, "login alice password-a"),
        "Success! alice logged into the system (also logged in from another session)"
    );

    assert_eq!(send(&mut alice, "quit"), "Logged out");
    assert_eq!(ws.active_users().unwrap(), ["bob"]);
}

#[test]
fn test_forced_logout_on_corrupt_registry() {
    let tmp = tempfile::tempdir().unwrap();
    let (config, ws) = open(tmp.path());
    let mut s = Session::new(ws);
    login(&mut s, "test5", "bdghkgaa");

    fs::write(config.logged_in_users_path(), "{ not json\n").unwrap();

    let reply = send(&mut s, "quit");
    assert_eq!(reply, "Forced logout (Session registry unavailable)");
    assert!(!s.is_logged_in());
    assert_eq!(s.identity(), None);
    assert_eq!(send(&mut s, "list"), "Login to continue");
}

#[test]
fn test_login_with_corrupt_registry() {
    let tmp = tempfile::tempdir().unwrap();
    let (config, ws) = open(tmp.path());
    let mut s = Session::new(ws.clone());
    send(&mut s, "register alice password123");

    fs::write(config.logged_in_users_path(), "{ not json\n").unwrap();

    let reply = send(&mut s, "login alice password123");
    assert_eq!(
        reply,
        "Success! alice logged into the system (session registry unavailable)"
    );
    assert!(!reply.contains(&*tmp.path().to_string_lossy()));
    assert!(s.is_logged_in());
    assert!(!ws.is_logged_in("alice"));

    send(&mut s, "write_file a.txt works");
    assert_eq!(
        send(&mut s, "read_file a.txt"),
        "Reading file from 0 bytes to 5 bytes\nworks"
    );
}

#[test]
fn test_multibyte_password_length() {
    let tmp = tempfile::tempdir().unwrap();
    let (_config, ws) = open(tmp.path());
    let mut s = Session::new(ws);

    assert_eq!(
        send(&mut s, "register uni ééééé"),
        "Password length should be at least 8 characters"
    );
    assert_eq!(
        send(&mut s, "login uni ééééé"),
        "You haven't registered! command: register <username> <password>"
    );
}

#[test]
fn test_write_file_onto_folder() {
    let tmp = tempfile::tempdir().unwrap();
    let (_config, ws) = open(tmp.path());
    let mut s = Session::new(ws);
    login(&mut s, "alice", "password123");

    send(&mut s, "create_folder movies");
    assert_eq!(
        send(&mut s, "write_file movies hello"),
        "Cannot write to movies: it is a folder"
    );
}

#[test]
fn test_state_survives_restart() {
    let tmp = tempfile::tempdir().unwrap();
    {
        let (_config, ws) = open(tmp.path());
        let mut s = Session::new(ws);
        login(&mut s, "persist", "password123");
        send(&mut s, "write_file note.txt kept");
        send(&mut s, "quit");
    }

    let (_config, ws) = open(tmp.path());
    let mut s = Session::new(ws);
    assert_eq!(
        send(&mut s, "login persist password123"),
        "Success! persist logged into the system"
    );
    assert_eq!(
        send(&mut s, "read_file note.txt"),
        "Reading file from 0 bytes to 4 bytes\nkept"
    );
}
