use std::process::{Command, Output};

fn mcc<I, S>(args: I) -> Output
where
    I: IntoIterator<Item = S>,
    S: AsRef<std::ffi::OsStr>,
{
    Command::new(env!("CARGO_BIN_EXE_mcc"))
        .args(args)
        .output()
        .expect("Failed to spawn compiler")
}

#[test]
fn emits_complete_routine() {
    let output = mcc(["a=3;b=4;a+b;"]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<_> = stdout.lines().collect();

    assert_eq!(&lines[..3], [".intel_syntax noprefix", ".globl main", "main:"]);
    assert_eq!(lines.last(), Some(&"\tret"));
    assert!(stdout.contains("\tsub     rsp, 208\n"));
    assert!(output.stderr.is_empty());
}

#[test]
fn annotate_flag_adds_comments() {
    let output = mcc(["--annotate", "a=1; a+2;"]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("\t# a=1\n"));
    assert!(stdout.contains("\t# a+2\n"));
}

#[test]
fn dumps_go_to_stderr() {
    let output = mcc(["--dump-tokens", "--dump-ast", "1;"]);
    assert!(output.status.success());

    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.starts_with("Tokens: "));
    assert!(stderr.contains("IntLiteral(\n"));
    assert!(stderr.contains("Ast: "));
}

#[test]
fn lexical_error_exits_without_assembly() {
    let output = mcc(["1$2;"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());

    let stderr = String::from_utf8(output.stderr).unwrap();
    assert_eq!(
        stderr,
        "1$2;\n ^ Lexical error: Bad character '$' in input stream\n"
    );
}

#[test]
fn syntax_error_exits_without_assembly() {
    let output = mcc(["(1+2;"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());

    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Expected `)`"));
}

#[test]
fn deep_nesting_is_a_diagnostic() {
    let levels = 5000;
    let text = format!("{}1{};", "(".repeat(levels), ")".repeat(levels));

    let output = mcc([text.as_str()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());

    let stderr = String::from_utf8(output.stderr).unwrap();
    let marker = format!(
        "\n{}^ Syntax error: Expression nested too deeply, limit is {} levels\n",
        " ".repeat(mcc::parse::MAX_NESTING),
        mcc::parse::MAX_NESTING
    );

    assert!(stderr.starts_with(&text));
    assert!(stderr.ends_with(&marker));
}

#[test]
fn wrong_argument_count_is_a_usage_error() {
    for args in [vec![], vec!["1;", "2;"]] {
        let output = mcc(args);
        assert!(!output.status.success());
        assert!(output.stdout.is_empty());
        assert!(!output.stderr.is_empty());
    }
}
