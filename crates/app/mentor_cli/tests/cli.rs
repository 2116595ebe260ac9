use assert_cmd::Command;
use predicates::prelude::*;

fn mentor() -> Command {
    let mut cmd = Command::cargo_bin("mentor").unwrap();
    cmd.env("CHAT_PROVIDER", "local").env("RUST_LOG", "off");
    cmd
}

#[test]
fn version_prints_package_version() {
    mentor()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn bye_ends_the_conversation() {
    mentor()
        .arg("chat")
        .write_stdin("bye\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Chatbot: Goodbye!"));
}

#[test]
fn messages_are_relayed_in_one_session() {
    mentor()
        .args(["chat", "--user-type", "aspiring", "--session", "cli-test"])
        .write_stdin("hello\n\nagain\nBYE\n")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("AI: [turn 1] hello")
                .and(predicate::str::contains("AI: [turn 2] again"))
                .and(predicate::str::contains("Chatbot: Goodbye!")),
        );
}

#[test]
fn end_of_input_exits_cleanly() {
    mentor().arg("chat").write_stdin("").assert().success();
}

#[test]
fn unknown_provider_fails() {
    mentor()
        .args(["chat", "--provider", "nope"])
        .write_stdin("bye\n")
        .assert()
        .failure();
}
