use copycat::errors::CopyCatError;
use copycat::generator::{SelectionOptions, SnapshotGenerator};
use copycat::ignore::PatternCache;
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;
use tokio::fs;

fn generator() -> SnapshotGenerator {
    SnapshotGenerator::new(Arc::new(PatternCache::new()))
}

async fn write(root: &Path, rel: &str, content: &[u8]) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await.unwrap();
    }
    fs::write(path, content).await.unwrap();
}

#[tokio::test]
async fn test_include_and_ignore_scenario() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, ".copycat", b"[INCLUDE]\nsrc/**\n[IGNORE]\nsrc/legacy/**\n").await;
    write(root, "src/a.ts", b"export const a = 1;").await;
    write(root, "src/legacy/b.ts", b"export const b = 2;").await;
    write(root, "README.md", b"# readme").await;

    let report = generator().generate(root).await.unwrap();
    let output = fs::read_to_string(root.join("copycat.md")).await.unwrap();

    assert_eq!(output, "src/a.ts\n```typescript\nexport const a = 1;\n```\n\n");
    assert_eq!(report.output_path, root.join("copycat.md"));
    assert_eq!(report.files_processed, 1);
    assert_eq!(report.files_skipped, 0);
}

#[tokio::test]
async fn test_output_is_sorted_and_idempotent() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, ".copycat", b"[INCLUDE]\n**/*\n").await;
    write(root, "b.rs", b"fn b() {}").await;
    write(root, "a/z.py", b"print('z')").await;
    write(root, "A.weird", b"???").await;

    let generator = generator();
    generator.generate(root).await.unwrap();
    let first = fs::read(root.join("copycat.md")).await.unwrap();
    generator.generate(root).await.unwrap();
    let second = fs::read(root.join("copycat.md")).await.unwrap();

    assert_eq!(first, second, "repeated runs must be byte-identical");
    let expected = "A.weird\n```\n???\n```\n\n\
                    a/z.py\n```python\nprint('z')\n```\n\n\
                    b.rs\n```rust\nfn b() {}\n```\n\n";
    assert_eq!(String::from_utf8(first).unwrap(), expected);
}

#[tokio::test]
async fn test_empty_include_equals_match_all() {
    let dir_a = tempdir().unwrap();
    let dir_b = tempdir().unwrap();
    for (root, config) in [
        (dir_a.path(), &b"[IGNORE]\n*.tmp\n"[..]),
        (dir_b.path(), &b"[INCLUDE]\n**/*\n[IGNORE]\n*.tmp\n"[..]),
    ] {
        write(root, ".copycat", config).await;
        write(root, "main.go", b"package main").await;
        write(root, "lib/util.sh", b"echo hi").await;
        write(root, "scratch.tmp", b"junk").await;
    }

    let generator = generator();
    generator.generate(dir_a.path()).await.unwrap();
    generator.generate(dir_b.path()).await.unwrap();

    let a = fs::read(dir_a.path().join("copycat.md")).await.unwrap();
    let b = fs::read(dir_b.path().join("copycat.md")).await.unwrap();
    assert_eq!(a, b);
    assert!(String::from_utf8(a).unwrap().contains("lib/util.sh\n```bash\n"));
}

#[tokio::test]
async fn test_always_ignored_never_appear() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, ".copycat", b"[INCLUDE]\n**/*\nnode_modules/**\n").await;
    write(root, "main.rs", b"fn main() {}").await;
    write(root, "node_modules/x.js", b"x").await;
    write(root, "packages/app/node_modules/y.js", b"y").await;
    write(root, ".git/config", b"[core]").await;
    write(root, "debug.log", b"log").await;
    write(root, "data.db", b"db").await;
    write(root, "copycat.md", b"stale snapshot").await;

    let report = generator().generate(root).await.unwrap();
    let output = fs::read_to_string(root.join("copycat.md")).await.unwrap();

    assert_eq!(output, "main.rs\n```rust\nfn main() {}\n```\n\n");
    assert_eq!(report.files_processed, 1);
}

#[tokio::test]
async fn test_skipped_files_render_notices() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, ".copycat", b"[INCLUDE]\nassets/**\n").await;
    write(root, "assets/big.txt", &vec![b'a'; 153_600]).await;
    write(root, "assets/logo.png", &[0x89, b'P', b'N', b'G', 0, 0, 0, 13]).await;

    let report = generator().generate(root).await.unwrap();
    let output = fs::read_to_string(root.join("copycat.md")).await.unwrap();

    assert_eq!(
        output,
        "assets/big.txt\n> Skipped: file too large (150.0 KB)\n\n\
         assets/logo.png\n> Skipped: binary file\n\n"
    );
    assert_eq!(report.files_processed, 0);
    assert_eq!(report.files_skipped, 2);
}

#[tokio::test]
async fn test_missing_config_aborts_without_output() {
    let dir = tempdir().unwrap();
    write(dir.path(), "main.rs", b"fn main() {}").await;

    let result = generator().generate(dir.path()).await;
    assert!(matches!(result, Err(CopyCatError::ConfigMissing(_))));
    assert!(fs::metadata(dir.path().join("copycat.md")).await.is_err());
}

#[tokio::test]
async fn test_invalid_pattern_aborts_run() {
    let dir = tempdir().unwrap();
    write(dir.path(), ".copycat", b"[INCLUDE]\nsrc/[abc\n").await;

    let result = generator().generate(dir.path()).await;
    assert!(matches!(result, Err(CopyCatError::InvalidPattern { .. })));
}

#[tokio::test]
async fn test_selection_of_folder_writes_beside_it() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, "pkg/a.rs", b"mod a;").await;
    write(root, "pkg/sub/b.rs", b"mod b;").await;
    write(root, "pkg/node_modules/m.js", b"m").await;
    write(root, "pkg/trace.log", b"log").await;

    let options = SelectionOptions {
        save_to_root: false,
        workspace_root: Some(root.to_path_buf()),
    };
    let report = generator()
        .generate_for_selection(&root.join("pkg"), &options)
        .await
        .unwrap();

    assert_eq!(report.output_path, root.join("pkg.copycat.md"));
    let output = fs::read_to_string(root.join("pkg.copycat.md")).await.unwrap();
    assert_eq!(
        output,
        "pkg/a.rs\n```rust\nmod a;\n```\n\npkg/sub/b.rs\n```rust\nmod b;\n```\n\n"
    );
}

#[tokio::test]
async fn test_selection_of_file_can_save_to_root() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, "src/deep/query.sql", b"select 1;").await;

    let options = SelectionOptions {
        save_to_root: true,
        workspace_root: Some(root.to_path_buf()),
    };
    let report = generator()
        .generate_for_selection(&root.join("src/deep/query.sql"), &options)
        .await
        .unwrap();

    assert_eq!(report.output_path, root.join("query.sql.copycat.md"));
    let output = fs::read_to_string(&report.output_path).await.unwrap();
    assert_eq!(output, "src/deep/query.sql\n```sql\nselect 1;\n```\n\n");
}

#[tokio::test]
async fn test_save_to_root_requires_workspace() {
    let dir = tempdir().unwrap();
    write(dir.path(), "one.rs", b"").await;

    let options = SelectionOptions {
        save_to_root: true,
        workspace_root: None,
    };
    let result = generator()
        .generate_for_selection(&dir.path().join("one.rs"), &options)
        .await;
    assert!(matches!(result, Err(CopyCatError::WorkspaceError(_))));
}

#[cfg(unix)]
#[tokio::test]
async fn test_symlinked_files_and_folders_are_included() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, ".copycat", b"[INCLUDE]\nsrc/**\n").await;
    write(root, "shared/a.ts", b"a").await;
    write(root, "vendor/util/b.ts", b"b").await;
    fs::create_dir_all(root.join("src")).await.unwrap();
    std::os::unix::fs::symlink(root.join("shared/a.ts"), root.join("src/link.ts")).unwrap();
    std::os::unix::fs::symlink(root.join("vendor/util"), root.join("src/util")).unwrap();
    // A link back to an ancestor must not hang the walk.
    std::os::unix::fs::symlink(root.join("src"), root.join("src/loop")).unwrap();

    let report = generator().generate(root).await.unwrap();
    let output = fs::read_to_string(root.join("copycat.md")).await.unwrap();

    assert_eq!(
        output,
        "src/link.ts\n```typescript\na\n```\n\nsrc/util/b.ts\n```typescript\nb\n```\n\n"
    );
    assert_eq!(report.files_processed, 2);
}
