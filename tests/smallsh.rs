use std::fs;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;
use std::process::{Child, Command, Output, Stdio};

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;

fn spawn(dir: &Path, home: &Path, args: &[&str]) -> Child {
    Command::new(env!("CARGO_BIN_EXE_smallsh"))
        .args(args)
        .current_dir(dir)
        .env("HOME", home)
        .env_remove("SMALLSH_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to start smallsh")
}

fn run_script(dir: &Path, home: &Path, args: &[&str], script: &str) -> (Output, u32) {
    let mut child = spawn(dir, home, args);
    let pid = child.id();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(script.as_bytes())
        .unwrap();
    (child.wait_with_output().unwrap(), pid)
}

fn text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[test]
fn builtins_redirection_and_status() {
    let work = tempfile::tempdir().unwrap();
    let home = tempfile::tempdir().unwrap();
    fs::write(work.path().join("self_interrupt.sh"), "kill -INT $$\n").unwrap();

    let script = "\
echo hello > out.txt
cat < out.txt
# just a comment

echo pid $$
false
status
sh self_interrupt.sh
status
cd
pwd
exit
echo never
";
    let (output, pid) = run_script(work.path(), home.path(), &[], script);
    let stdout = text(&output.stdout);

    assert!(output.status.success(), "stderr: {}", text(&output.stderr));
    assert_eq!(fs::read_to_string(work.path().join("out.txt")).unwrap(), "hello\n");
    assert!(stdout.contains(": hello\n"), "{stdout}");
    assert!(stdout.contains(&format!("pid {pid}\n")), "{stdout}");
    assert!(stdout.contains("exit value 1\n"), "{stdout}");
    assert_eq!(stdout.matches("terminated by signal: 2\n").count(), 2, "{stdout}");
    assert!(stdout.contains(&format!("{}\n", home.path().canonicalize().unwrap().display())));
    assert!(!stdout.contains("never"));
}

#[test]
fn background_jobs_are_reaped_before_the_next_prompt() {
    let work = tempfile::tempdir().unwrap();
    let script = "sleep 0 &\nsleep 1\nstatus\nexit\n";
    let (output, _) = run_script(work.path(), work.path(), &[], script);
    let stdout = text(&output.stdout);

    let started = stdout
        .split("background pid is ")
        .nth(1)
        .and_then(|rest| rest.lines().next())
        .expect("background pid announced");
    let done = format!("background pid {started} is done: exit value 0\n");
    assert!(stdout.contains(&done), "{stdout}");

    let done_at = stdout.find(&done).unwrap();
    let status_at = stdout.rfind("exit value 0\n").unwrap();
    assert!(done_at < status_at, "{stdout}");
}

#[test]
fn bad_lines_are_rejected_and_the_loop_continues() {
    let work = tempfile::tempdir().unwrap();
    let script = "cat <\necho this line is far too long\necho ok\nls > \nstatus\nexit\n";
    let (output, _) = run_script(work.path(), work.path(), &["--max-line", "24"], script);
    let stdout = text(&output.stdout);
    let stderr = text(&output.stderr);

    assert!(output.status.success());
    assert!(stdout.contains(": ok\n"), "{stdout}");
    assert!(!stdout.contains("far too long"), "{stdout}");
    assert!(stdout.contains("exit value 0\n"), "{stdout}");
    assert!(stderr.contains("expected filename after '<'"), "{stderr}");
    assert!(stderr.contains("expected filename after '>'"), "{stderr}");
    assert!(stderr.contains("exceeds 24 bytes"), "{stderr}");
}

#[test]
fn failed_cd_leaves_directory_unchanged() {
    let work = tempfile::tempdir().unwrap();
    let script = "cd nonexistent_dir_xyz\npwd\n";
    let (output, _) = run_script(work.path(), work.path(), &[], script);
    let stdout = text(&output.stdout);

    assert!(output.status.success(), "end of input acts like exit");
    assert!(stdout.contains(&format!("{}\n", work.path().canonicalize().unwrap().display())));
    assert!(text(&output.stderr).contains("cd: nonexistent_dir_xyz"));
}

#[test]
fn child_redirection_failures_set_sentinel_status() {
    let work = tempfile::tempdir().unwrap();
    let script = "cat < missing.txt\nstatus\nno-such-program-xyz\nstatus\n";
    let (output, _) = run_script(work.path(), work.path(), &[], script);
    let stdout = text(&output.stdout);
    let stderr = text(&output.stderr);

    let statuses: Vec<_> = stdout.matches("exit value ").collect();
    assert_eq!(statuses.len(), 2, "{stdout}");
    assert!(stdout.contains("exit value 1\n"), "{stdout}");
    assert!(stdout.contains("exit value 2\n"), "{stdout}");
    assert!(stderr.contains("cannot open missing.txt for input"), "{stderr}");
    assert!(stderr.contains("no-such-program-xyz"), "{stderr}");
}

#[test]
fn stop_signal_toggles_foreground_only_mode() {
    let work = tempfile::tempdir().unwrap();
    let mut child = spawn(work.path(), work.path(), &[]);
    let mut stdin = child.stdin.take().unwrap();
    let mut stdout = BufReader::new(child.stdout.take().unwrap());

    // wait until the loop is running so the handler is installed
    stdin.write_all(b"status\n").unwrap();
    let mut line = String::new();
    while !line.contains("exit value 0") {
        line.clear();
        assert_ne!(stdout.read_line(&mut line).unwrap(), 0, "smallsh exited early");
    }

    let pid = Pid::from_raw(child.id() as i32);
    kill(pid, Signal::SIGTSTP).unwrap();
    stdin.write_all(b"sleep 0 &\nstatus\n").unwrap();
    let mut entered = String::new();
    while !entered.contains("exit value 0") {
        line.clear();
        assert_ne!(stdout.read_line(&mut line).unwrap(), 0, "smallsh exited early");
        entered.push_str(&line);
    }
    assert!(entered.contains("Entering foreground-only mode (& is now ignored)"), "{entered}");
    assert!(!entered.contains("background pid is"), "{entered}");

    kill(pid, Signal::SIGTSTP).unwrap();
    stdin.write_all(b"sleep 0 &\nsleep 1\nexit\n").unwrap();
    drop(stdin);

    let mut rest = String::new();
    stdout.read_to_string(&mut rest).unwrap();
    assert!(child.wait().unwrap().success());

    assert!(rest.contains("Exiting foreground-only mode"), "{rest}");
    assert_eq!(rest.matches("background pid is ").count(), 1, "{rest}");
    assert!(rest.contains("is done: exit value 0"), "{rest}");
}

#[test]
fn interrupt_does_not_stop_the_shell() {
    let work = tempfile::tempdir().unwrap();
    let mut child = spawn(work.path(), work.path(), &[]);
    let mut stdin = child.stdin.take().unwrap();
    let mut stdout = BufReader::new(child.stdout.take().unwrap());

    // wait until the loop is running so SIGINT is already ignored
    stdin.write_all(b"status\n").unwrap();
    let mut line = String::new();
    while !line.contains("exit value 0") {
        line.clear();
        assert_ne!(stdout.read_line(&mut line).unwrap(), 0, "smallsh exited early");
    }

    let pid = child.id();
    kill(Pid::from_raw(pid as i32), Signal::SIGINT).unwrap();
    stdin.write_all(b"echo alive $$\nexit\n").unwrap();
    drop(stdin);

    let mut rest = String::new();
    stdout.read_to_string(&mut rest).unwrap();
    assert!(child.wait().unwrap().success());
    assert!(rest.contains(&format!("alive {pid}\n")), "{rest}");
}

#[test]
fn foreground_child_ignores_stop_signal() {
    let work = tempfile::tempdir().unwrap();
    fs::write(work.path().join("self_stop.sh"), "kill -TSTP $$\nexit 7\n").unwrap();

    let script = "sh self_stop.sh\nstatus\nexit\n";
    let (output, _) = run_script(work.path(), work.path(), &[], script);
    let stdout = text(&output.stdout);

    assert!(output.status.success(), "stderr: {}", text(&output.stderr));
    assert!(stdout.contains("exit value 7\n"), "{stdout}");
    assert!(!stdout.contains("foreground-only"), "{stdout}");
}

#[test]
fn help_and_version_flags() {
    let output = Command::new(env!("CARGO_BIN_EXE_smallsh"))
        .arg("--version")
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(text(&output.stdout).starts_with("smallsh "));

    let output = Command::new(env!("CARGO_BIN_EXE_smallsh"))
        .arg("--bogus")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}
