use assert_cmd::Command;
use ids_render::test_utils::TestProject;
use predicates::prelude::*;

fn ids_render(project: &TestProject) -> Command {
    let mut cmd = Command::cargo_bin("ids-render").unwrap();
    cmd.current_dir(project.root())
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .arg("--no-progress");
    cmd
}

#[test]
fn test_render_writes_pages_and_assets() {
    let project = TestProject::new().unwrap();

    ids_render(&project)
        .arg("render")
        .assert()
        .success()
        .stdout(predicate::str::contains("Rendered 2 scenario(s)"));

    let html = project.read("out/html/card-basic/index.html").unwrap();
    assert!(html.contains(r#"<div class="card"><h2>Hello</h2><p>World</p></div>"#), "{html}");
    assert!(html.contains(r#"<title>card-basic</title>"#));
    assert!(html.contains(r#"href="css/1-text.css""#));
    assert!(html.contains(r#"href="css/3-card.css""#));
    assert!(html.contains(r#"src="js/1-base.js""#));

    assert_eq!(
        project.read("out/html/card-basic/css/2-base.css").unwrap(),
        "/* css/base.css */\n"
    );
    assert!(project.exists("out/html/card-basic/js/1-base.js"));

    // The paragraph page never touched core/card.
    assert!(project.exists("out/html/paragraph-only/css/1-text.css"));
    assert!(!project.exists("out/html/paragraph-only/css/3-card.css"));
}

#[test]
fn test_render_isolates_failing_scenarios() {
    let project = TestProject::new().unwrap();
    project
        .write_scenarios(
            r"
- id: bad
  component: card
  slots:
    body: { component: broken }
- id: good
  component: paragraph
  slots: { text: Fine }
",
        )
        .unwrap();

    ids_render(&project)
        .arg("render")
        .assert()
        .failure()
        .stdout(predicate::str::contains("Rendered 1 scenario(s)"))
        .stderr(predicate::str::contains("1 of 2 scenario(s) failed to render"))
        .stderr(predicate::str::contains("bad"));

    assert!(project.exists("out/html/good/index.html"));
    assert!(!project.exists("out/html/bad"));
}

#[test]
fn test_render_isolates_asset_copy_failures() {
    let project = TestProject::new().unwrap();
    std::fs::remove_file(project.path("assets/css/card.css")).unwrap();

    ids_render(&project)
        .arg("render")
        .assert()
        .failure()
        .stdout(predicate::str::contains("Rendered 1 scenario(s)"))
        .stderr(predicate::str::contains("card-basic"))
        .stderr(predicate::str::contains("Failed to copy asset"))
        .stderr(predicate::str::contains("1 of 2 scenario(s) failed to render"));

    assert!(project.exists("out/html/paragraph-only/index.html"));
    assert!(project.exists("out/html/paragraph-only/css/1-text.css"));
}

#[test]
fn test_render_filter_and_dry_run() {
    let project = TestProject::new().unwrap();

    ids_render(&project).args(["render", "--filter", "paragraph"]).assert().success();
    assert!(project.exists("out/html/paragraph-only/index.html"));
    assert!(!project.exists("out/html/card-basic"));

    let dry = TestProject::new().unwrap();
    ids_render(&dry)
        .args(["render", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dry run"));
    assert!(!dry.exists("out"));
}

#[test]
fn test_snapshot_writes_sorted_yaml() {
    let project = TestProject::new().unwrap();

    ids_render(&project)
        .arg("snapshot")
        .assert()
        .success()
        .stdout(predicate::str::contains("Writing card-basic to"))
        .stdout(predicate::str::contains("Wrote 2 snapshot(s)"));

    let yaml = project.read("out/snapshots/paragraph-only.yaml").unwrap();
    assert_eq!(yaml, "'#attached':\n  library:\n  - core/text\n'#text': Alone\n'#theme': paragraph\n");

    let card = project.read("out/snapshots/card-basic.yaml").unwrap();
    assert!(card.contains("'#theme': card"));
    assert!(card.contains("'#theme': paragraph"));
    assert!(!card.contains("#token"));
}

#[test]
fn test_snapshot_dry_run_and_abort() {
    let project = TestProject::new().unwrap();
    ids_render(&project).args(["snapshot", "-n"]).assert().success();
    assert!(!project.exists("out/snapshots"));

    project.write_scenarios("- { id: ghostly, component: ghost }\n").unwrap();
    ids_render(&project)
        .arg("snapshot")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to render scenario 'ghostly'"))
        .stderr(predicate::str::contains("[components.ghost]"));
}

#[test]
fn test_dump_writes_snapshots_and_pages() {
    let project = TestProject::new().unwrap();

    ids_render(&project)
        .args(["dump", "--filter", "card"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 1 snapshot(s)"))
        .stdout(predicate::str::contains("Rendered 1 scenario(s)"))
        .stdout(predicate::str::contains("HTML complete"));

    assert!(project.read("out/snapshots/card-basic.yaml").unwrap().contains("'#theme': card"));
    assert!(project.exists("out/html/card-basic/index.html"));
    assert!(!project.exists("out/snapshots/paragraph-only.yaml"));
    assert!(!project.exists("out/html/paragraph-only"));
}

#[test]
fn test_dump_stops_before_rendering_when_a_snapshot_fails() {
    let project = TestProject::new().unwrap();
    project.write_scenarios("- { id: ghostly, component: ghost }\n").unwrap();

    ids_render(&project)
        .arg("dump")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to render scenario 'ghostly'"))
        .stdout(predicate::str::contains("Snapshots complete").not());
    assert!(!project.exists("out/html"));
}

#[test]
fn test_missing_project_file() {
    let project = TestProject::new().unwrap();
    ids_render(&project)
        .args(["-c", "nowhere.toml", "render"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no project file"));
}
