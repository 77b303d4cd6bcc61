//! Runs the `pie` binary over the transcripts in `tests/cmd`, using [trycmd].

#[test]
fn cli_tests() {
    std::env::set_current_dir("..").unwrap();
    trycmd::TestCases::new().case("tests/cmd/*.md");
}
