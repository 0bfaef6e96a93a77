use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn todos(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("todos").unwrap();
    cmd.current_dir(dir.path()).env_remove("RUST_LOG");
    cmd
}

#[test]
fn add_then_show() {
    let dir = TempDir::new().unwrap();
    todos(&dir)
        .args(&["add", "buy", "milk"])
        .assert()
        .success()
        .stdout("1-Buy milk\n");
    todos(&dir)
        .args(&["add", "walk the dog"])
        .assert()
        .success();
    todos(&dir)
        .arg("show")
        .assert()
        .success()
        .stdout("1-Buy milk\n2-Walk the dog\n");
    assert_eq!(
        fs::read_to_string(dir.path().join("todo.txt")).unwrap(),
        "Buy milk\nWalk the dog\n"
    );
}

#[test]
fn show_empty_list() {
    let dir = TempDir::new().unwrap();
    todos(&dir)
        .arg("show")
        .assert()
        .success()
        .stdout("Your list is empty.\n");
}

#[test]
fn edit_and_complete() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("todo.txt"), "Buy milk\nPay rent\n").unwrap();
    todos(&dir)
        .args(&["edit", "2", "pay", "the", "rent"])
        .assert()
        .success()
        .stdout("2-Pay the rent (was: Pay rent)\n");
    todos(&dir)
        .args(&["complete", "1"])
        .assert()
        .success()
        .stdout("Todo \"Buy milk\" was removed from the list.\n");
    assert_eq!(
        fs::read_to_string(dir.path().join("todo.txt")).unwrap(),
        "Pay the rent\n"
    );
}

#[test]
fn complete_unknown_item_fails_without_writing() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("todo.txt"), "Buy milk\n").unwrap();
    todos(&dir)
        .args(&["complete", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no item 5"));
    todos(&dir)
        .args(&["complete", "five"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid item number"));
    assert_eq!(
        fs::read_to_string(dir.path().join("todo.txt")).unwrap(),
        "Buy milk\n"
    );
}

#[test]
fn file_flag_overrides_location() {
    let dir = TempDir::new().unwrap();
    todos(&dir)
        .args(&["--file", "lists/home.txt", "add", "fix sink"])
        .assert()
        .success();
    assert_eq!(
        fs::read_to_string(dir.path().join("lists/home.txt")).unwrap(),
        "Fix sink\n"
    );
    assert!(!dir.path().join("todo.txt").exists());
}

#[test]
fn config_file_sets_todo_file() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("conf")).unwrap();
    fs::write(dir.path().join("conf/todos.yaml"), "todo_file: work.txt\n").unwrap();
    fs::write(dir.path().join("conf/work.txt"), "Send report\n").unwrap();
    todos(&dir)
        .args(&["--config", "conf/todos.yaml", "show"])
        .assert()
        .success()
        .stdout("1-Send report\n");
}

#[test]
fn missing_explicit_config_fails() {
    let dir = TempDir::new().unwrap();
    todos(&dir)
        .args(&["--config", "absent.yaml", "show"])
        .assert()
        .failure();
}

#[test]
fn shell_reads_piped_commands() {
    let dir = TempDir::new().unwrap();
    todos(&dir)
        .write_stdin("n buy milk\nadd\nwalk dog\n\ndisp\ne 1\nbuy oat milk\nc 2\nfrobnicate\nx\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("It is "))
        .stdout(predicate::str::contains("1-Buy milk\n2-Walk dog\n"))
        .stdout(predicate::str::contains("Todo \"Walk dog\" was removed from the list."))
        .stdout(predicate::str::contains("Command is not valid."))
        .stdout(predicate::str::contains("Bye!"));
    assert_eq!(
        fs::read_to_string(dir.path().join("todo.txt")).unwrap(),
        "Buy oat milk\n"
    );
}
