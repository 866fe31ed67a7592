use std::process::Command;

fn threes(args: &[&str]) -> String {
    let output = Command::new(env!("CARGO_BIN_EXE_threes"))
        .args(args)
        .output()
        .expect("failed to run the threes binary");
    assert!(
        output.status.success(),
        "threes exited with {:?}: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("stdout is utf-8")
}

#[test]
fn plays_scripted_moves_and_reports_a_score() {
    let stdout = threes(&["--seed", "7", "--moves", "left,up,right,down"]);
    assert!(stdout.lines().any(|line| line.starts_with("score: ")));
    assert!(stdout.lines().count() >= 5, "expected a board and a score");
}

#[test]
fn seeded_sessions_are_reproducible() {
    let args = ["--seed", "11", "--moves", "l,u,r,d,l", "--print-layout"];
    assert_eq!(threes(&args), threes(&args));
}

#[test]
fn layout_round_trips_through_the_cli() {
    let first = threes(&["--seed", "3", "--rows", "3", "--columns", "3", "--print-layout"]);
    let layout = first
        .lines()
        .find(|line| line.starts_with("threes:v1:3x3:"))
        .expect("layout line printed");

    let second = threes(&["--layout", layout, "--print-layout"]);
    assert!(second.lines().any(|line| line == layout));
}
