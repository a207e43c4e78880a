use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn dfdlr_bin() -> &'static str {
    env!("CARGO_BIN_EXE_dfdlr")
}

fn test_temp_dir(tag: &str) -> PathBuf {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("dfdlr-cli-e2e-{tag}-{}-{ts}", std::process::id()));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn run_dfdlr(args: &[&str]) -> Output {
    Command::new(dfdlr_bin())
        .args(args)
        .output()
        .expect("run dfdlr")
}

const FORMAT_XSD: &str = r#"
    <xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
               xmlns:dfdl="http://www.ogf.org/dfdl/dfdl-1.0/"
               targetNamespace="urn:feed:format">
        <xs:annotation><xs:appinfo>
            <dfdl:defineFormat name="base">
                <dfdl:format separator="LF;"/>
            </dfdl:defineFormat>
        </xs:appinfo></xs:annotation>
    </xs:schema>
"#;

const MAIN_XSD: &str = r#"
    <xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
               xmlns:dfdl="http://www.ogf.org/dfdl/dfdl-1.0/"
               targetNamespace="urn:feed">
        <xs:import namespace="urn:feed:format" schemaLocation="format.xsd"/>
        <xs:element name="person" maxOccurs="unbounded">
            <xs:complexType><xs:sequence>
                <xs:element name="name" type="xs:string"
                            dfdl:initiator="NAME:" dfdl:length="10"/>
            </xs:sequence></xs:complexType>
        </xs:element>
    </xs:schema>
"#;

fn write_fixture(dir: &Path, feed: &str) -> (String, String) {
    fs::write(dir.join("format.xsd"), FORMAT_XSD).expect("write format.xsd");
    fs::write(dir.join("main.xsd"), MAIN_XSD).expect("write main.xsd");
    fs::write(dir.join("feed.txt"), feed).expect("write feed.txt");
    (
        dir.join("main.xsd").to_str().unwrap().to_string(),
        dir.join("feed.txt").to_str().unwrap().to_string(),
    )
}

#[test]
fn cli_decode_writes_xml_file() {
    let dir = test_temp_dir("decode");
    let (schema, feed) = write_fixture(&dir, "NAME:John      \n");
    let out = dir.join("out.xml");

    let result = run_dfdlr(&["decode", "-s", &schema, "-i", &feed, "-o", out.to_str().unwrap()]);
    assert!(
        result.status.success(),
        "decode failed: {}",
        String::from_utf8_lossy(&result.stderr)
    );

    let xml = fs::read_to_string(&out).expect("read output");
    assert_eq!(xml, "<root><person><name>John      </name></person></root>");
}

#[test]
fn cli_decode_derives_output_path() {
    let dir = test_temp_dir("derive");
    let (schema, feed) = write_fixture(&dir, "NAME:Ada       \n");

    let result = run_dfdlr(&["decode", "-s", &schema, "-i", &feed]);
    assert!(
        result.status.success(),
        "decode failed: {}",
        String::from_utf8_lossy(&result.stderr)
    );

    let xml = fs::read_to_string(dir.join("feed.xml")).expect("derived output exists");
    assert!(xml.contains("<name>Ada       </name>"), "{xml}");
}

#[test]
fn cli_decode_pretty_to_stdout() {
    let dir = test_temp_dir("pretty");
    let (schema, feed) = write_fixture(&dir, "NAME:John      \n");

    let result = run_dfdlr(&["decode", "-s", &schema, "-i", &feed, "-o", "-", "--pretty"]);
    assert!(result.status.success());
    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(stdout.contains("\n  <person>\n"), "{stdout}");
}

#[test]
fn cli_transform_is_accepted_as_noop() {
    let dir = test_temp_dir("transform");
    let (schema, feed) = write_fixture(&dir, "NAME:John      \n");

    let result = run_dfdlr(&[
        "decode", "-s", &schema, "-i", &feed, "-o", "-", "--transform", "t.xslt",
    ]);
    assert!(result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("ohne Wirkung"), "{stderr}");
}

#[test]
fn cli_missing_separator_exits_nonzero() {
    let dir = test_temp_dir("nosep");
    // Format-Block ohne separator.
    let format_xsd = FORMAT_XSD.replace("separator=\"LF;\"", "encoding=\"UTF-8\"");
    fs::write(dir.join("format.xsd"), format_xsd).unwrap();
    fs::write(dir.join("main.xsd"), MAIN_XSD).unwrap();
    fs::write(dir.join("feed.txt"), "NAME:John      \n").unwrap();

    let result = run_dfdlr(&[
        "decode",
        "-s",
        dir.join("main.xsd").to_str().unwrap(),
        "-i",
        dir.join("feed.txt").to_str().unwrap(),
        "-o",
        "-",
    ]);
    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("separator"), "{stderr}");
}

#[test]
fn cli_dump_prints_the_model() {
    let dir = test_temp_dir("dump");
    let (schema, _) = write_fixture(&dir, "");

    let result = run_dfdlr(&["dump", "-s", &schema]);
    assert!(result.status.success());
    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(stdout.contains("element urn:feed:person"), "{stdout}");
    assert!(stdout.contains("field urn:feed:name"), "{stdout}");
    assert!(stdout.contains("initiator=\"NAME:\""), "{stdout}");
    assert!(stdout.contains("length=10"), "{stdout}");
    assert!(stdout.contains("separator"), "{stdout}");
}

#[test]
fn cli_missing_schema_file_exits_nonzero() {
    let dir = test_temp_dir("noschema");
    fs::write(dir.join("feed.txt"), "x\n").unwrap();

    let result = run_dfdlr(&[
        "decode",
        "-s",
        dir.join("nope.xsd").to_str().unwrap(),
        "-i",
        dir.join("feed.txt").to_str().unwrap(),
        "-o",
        "-",
    ]);
    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("Schema-Parse-Fehler"), "{stderr}");
}
