use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;
use zip::ZipWriter;
use zip::write::FileOptions;

const CONTAINER_XML: &str = r#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
    <rootfiles>
        <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
    </rootfiles>
</container>"#;

const OPF_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<package version="2.0" xmlns="http://www.idpf.org/2007/opf" unique-identifier="BookId">
    <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
        <dc:title>Test Book</dc:title>
        <dc:language>en</dc:language>
    </metadata>
    <manifest>
        <item id="ncx" href="toc.ncx" media-type="application/x-dtbncx+xml"/>
        <item id="ch1" href="ch1.xhtml" media-type="application/xhtml+xml"/>
    </manifest>
    <spine toc="ncx"><itemref idref="ch1"/></spine>
</package>"#;

const NCX_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
<docTitle><text>Test Book</text></docTitle>
<navMap>
  <navPoint id="n1" playOrder="1"><navLabel><text>Intro</text></navLabel><content src="ch1.xhtml"/></navPoint>
  <navPoint id="n2" playOrder="2"><navLabel><text></text></navLabel><content src="ch2.xhtml"/>
    <navPoint id="n3" playOrder="3"><navLabel><text>Part 1</text></navLabel><content src="ch2.xhtml#p1"/></navPoint>
  </navPoint>
</navMap>
</ncx>"#;

const EMPTY_NCX_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
<navMap></navMap>
</ncx>"#;

fn write_epub(path: &Path, entries: &[(&str, &str)]) {
    let file = File::create(path).unwrap();
    let mut zip = ZipWriter::new(file);
    for (name, content) in entries {
        zip.start_file(*name, FileOptions::<()>::default()).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

fn write_book(path: &Path, ncx: &str) {
    write_epub(
        path,
        &[
            ("mimetype", "application/epub+zip"),
            ("META-INF/container.xml", CONTAINER_XML),
            ("OEBPS/content.opf", OPF_XML),
            ("OEBPS/toc.ncx", ncx),
        ],
    );
}

fn epub_toc() -> Command {
    Command::cargo_bin("epub-toc").unwrap()
}

#[test]
fn test_help() {
    epub_toc()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("EPUB"));
}

#[test]
fn test_nonexistent_file() {
    epub_toc()
        .arg("/nonexistent/book.epub")
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("错误"));
}

#[test]
fn test_not_an_epub() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("plain.epub");
    std::fs::write(&path, "definitely not a zip").unwrap();

    epub_toc()
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_indented_output() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("book.epub");
    write_book(&path, NCX_XML);

    epub_toc()
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("📖 Test Book"))
        .stdout(predicate::str::contains("• Intro\n• Untitled\n  • Part 1\n"));
}

#[test]
fn test_markdown_output_with_paths() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("book.epub");
    write_book(&path, NCX_XML);

    epub_toc()
        .args(["--format", "markdown", "--paths", "--placeholder", "(untitled)"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("# Test Book\n\n"))
        .stdout(predicate::str::contains("## Intro → OEBPS/ch1.xhtml\n"))
        .stdout(predicate::str::contains("## (untitled) → OEBPS/ch2.xhtml\n"))
        .stdout(predicate::str::contains("### Part 1 → OEBPS/ch2.xhtml#p1\n"));
}

#[test]
fn test_json_output() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("book.epub");
    write_book(&path, NCX_XML);

    let output = epub_toc()
        .args(["-f", "json", "--no-title"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(value.get("title").is_none());
    assert_eq!(value["chapters"][1]["children"][0]["title"], "Part 1");
    assert_eq!(value["chapters"][1]["children"][0]["depth"], 1);
}

#[test]
fn test_save_markdown_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("My Book.epub");
    write_book(&path, NCX_XML);

    epub_toc()
        .arg("--save")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("TOC saved to:"));

    let saved = std::fs::read_to_string(dir.path().join("My Book - ToC.md")).unwrap();
    assert_eq!(saved, "# Test Book\n\n## Intro\n## Untitled\n### Part 1\n");
}

#[test]
fn test_empty_navigation_policy() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.epub");
    write_book(&path, EMPTY_NCX_XML);

    epub_toc()
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::is_empty());

    epub_toc()
        .args(["--allow-empty", "--no-title"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_missing_navigation() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("no-nav.epub");
    let opf = OPF_XML.replace(
        r#"<item id="ncx" href="toc.ncx" media-type="application/x-dtbncx+xml"/>"#,
        "",
    );
    write_epub(
        &path,
        &[
            ("mimetype", "application/epub+zip"),
            ("META-INF/container.xml", CONTAINER_XML),
            ("OEBPS/content.opf", &opf),
        ],
    );

    epub_toc()
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("book.epub");
    write_book(&path, NCX_XML);

    let config_path = dir.path().join("toc.yaml");
    std::fs::write(&config_path, "style: tree\ninclude_title: false\nmax_depth: 1\n").unwrap();

    epub_toc()
        .arg("--config")
        .arg(&config_path)
        .arg(&path)
        .assert()
        .success()
        .stdout("├── Intro\n└── Untitled\n");
}

#[test]
fn test_invalid_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("book.epub");
    write_book(&path, NCX_XML);

    let config_path = dir.path().join("toc.yaml");
    std::fs::write(&config_path, "style: sideways\n").unwrap();

    epub_toc()
        .arg("-c")
        .arg(&config_path)
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_deeply_nested_navigation_fails_cleanly() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("deep.epub");
    let depth = 10_000;
    let ncx = format!(
        "<ncx><navMap>{}{}</navMap></ncx>",
        "<navPoint><navLabel><text>x</text></navLabel><content src=\"a.xhtml\"/>".repeat(depth),
        "</navPoint>".repeat(depth)
    );
    write_book(&path, &ncx);

    epub_toc()
        .arg(&path)
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("错误: 导航结构无效"));
}
