use snapkit_core::{Application, DesktopFile, DesktopFileError};
use std::fs;
use std::path::Path;

const SOURCE_ENTRY: &str = "[Desktop Entry]
Name=Foo
Exec=in-snap-exe %U
Icon=/usr/share/icons/foo.png

[Desktop Action new-window]
Name=New Window
Exec=in-snap-exe --new-window
";

fn write_source(prime_dir: &Path, relative: &str, contents: &str) {
    let path = prime_dir.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

#[test]
fn exec_lines_point_at_the_app_launcher() {
    let prime = tempfile::tempdir().unwrap();
    write_source(prime.path(), "usr/share/applications/foo.desktop", SOURCE_ENTRY);
    write_source(prime.path(), "usr/share/icons/foo.png", "png");

    let desktop = DesktopFile::new(
        "foo",
        "bar",
        "usr/share/applications/foo.desktop",
        prime.path(),
    );
    let target = desktop.write(Path::new("meta/gui"), None).unwrap();

    assert_eq!(target, prime.path().join("meta/gui/bar.desktop"));
    assert_eq!(
        fs::read_to_string(target).unwrap(),
        "[Desktop Entry]
Name=Foo
Exec=foo.bar %U
Icon=${SNAP}/usr/share/icons/foo.png

[Desktop Action new-window]
Name=New Window
Exec=foo.bar --new-window
"
    );
}

#[test]
fn app_named_like_snap_uses_bare_snap_name() {
    let prime = tempfile::tempdir().unwrap();
    write_source(prime.path(), "foo.desktop", "[Desktop Entry]\nExec=foo-bin\n");

    let target = DesktopFile::new("foo", "foo", "foo.desktop", prime.path())
        .write(Path::new("gui"), None)
        .unwrap();

    assert_eq!(
        fs::read_to_string(target).unwrap(),
        "[Desktop Entry]\nExec=foo\n"
    );
}

#[test]
fn icon_path_overrides_source_icon() {
    let prime = tempfile::tempdir().unwrap();
    write_source(prime.path(), "foo.desktop", SOURCE_ENTRY);

    let target = DesktopFile::new("foo", "bar", "foo.desktop", prime.path())
        .write(Path::new("gui"), Some("meta/gui/icon.svg"))
        .unwrap();

    let contents = fs::read_to_string(target).unwrap();
    assert!(contents.contains("\nIcon=${SNAP}/meta/gui/icon.svg\n"));
}

#[test]
fn icon_outside_prime_is_kept() {
    let prime = tempfile::tempdir().unwrap();
    write_source(prime.path(), "foo.desktop", SOURCE_ENTRY);

    let target = DesktopFile::new("foo", "bar", "foo.desktop", prime.path())
        .write(Path::new("gui"), None)
        .unwrap();

    let contents = fs::read_to_string(target).unwrap();
    assert!(contents.contains("\nIcon=/usr/share/icons/foo.png\n"));
}

#[test]
fn missing_source_is_reported() {
    let prime = tempfile::tempdir().unwrap();

    let err = DesktopFile::new("foo", "bar", "absent.desktop", prime.path())
        .write(Path::new("gui"), None)
        .unwrap_err();

    assert!(matches!(err, DesktopFileError::Missing(ref path) if path.ends_with("absent.desktop")));
    assert!(!prime.path().join("gui").exists());
}

#[test]
fn malformed_sources_are_rejected() {
    let prime = tempfile::tempdir().unwrap();
    write_source(prime.path(), "no-section.desktop", "Exec=foo\n");
    write_source(
        prime.path(),
        "no-exec.desktop",
        "[Desktop Entry]\nName=Foo\n[Desktop Action x]\nExec=foo\n",
    );

    let err = DesktopFile::new("foo", "bar", "no-section.desktop", prime.path())
        .write(Path::new("gui"), None)
        .unwrap_err();
    assert!(matches!(err, DesktopFileError::MissingEntrySection(_)));

    let err = DesktopFile::new("foo", "bar", "no-exec.desktop", prime.path())
        .write(Path::new("gui"), None)
        .unwrap_err();
    assert!(matches!(err, DesktopFileError::MissingExec(_)));
}

#[test]
fn application_desktop_key_builds_generator_and_is_not_serialized() {
    let prime = tempfile::tempdir().unwrap();
    write_source(prime.path(), "share/bar.desktop", SOURCE_ENTRY);
    let app = Application::from_yaml("bar", "command: bin/bar\ndesktop: share/bar.desktop\n")
        .unwrap();

    let target = app
        .desktop_file("foo", prime.path())
        .unwrap()
        .write(Path::new("meta/gui"), None)
        .unwrap();

    assert!(fs::read_to_string(target).unwrap().contains("Exec=foo.bar %U"));
    assert!(!app.to_yaml().unwrap().contains("desktop"));
    assert!(Application::from_yaml("bar", "command: bin/bar\n")
        .unwrap()
        .desktop_file("foo", prime.path())
        .is_none());
}

#[test]
fn quoted_exec_program_is_replaced_whole() {
    let prime = tempfile::tempdir().unwrap();
    write_source(
        prime.path(),
        "foo.desktop",
        "[Desktop Entry]\nExec=\"/opt/my app/run\" --private %U\n",
    );

    let target = DesktopFile::new("foo", "bar", "foo.desktop", prime.path())
        .write(Path::new("gui"), None)
        .unwrap();

    assert_eq!(
        fs::read_to_string(target).unwrap(),
        "[Desktop Entry]\nExec=foo.bar --private %U\n"
    );
}
