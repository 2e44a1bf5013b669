use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;

use quiversnip::consts::NODES_HDR_SIZE;
use quiversnip::lock::lock_file_path;
use quiversnip::{FileStore, NodeStore, SnipConfig, SnipError, SnippetManager};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn unique_root(prefix: &str) -> PathBuf {
    let pid = std::process::id();
    let t = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    let base = std::env::temp_dir();
    base.join(format!("qsnip-fs-{prefix}-{pid}-{t}-{id}"))
}

fn cfg() -> SnipConfig {
    // fsync в тестах не нужен
    SnipConfig::default().with_data_fsync(false)
}

#[test]
fn snippets_survive_reopen() -> Result<()> {
    let root = unique_root("reopen");
    let db = root.join("project.qsn");
    let src = root.join("src");
    fs::create_dir_all(&src)?;
    fs::write(src.join("b.idc"), "auto b;")?;
    fs::write(src.join("a.py"), "a = 1")?;

    {
        let store = FileStore::create_with_config(&db, &cfg())?;
        let mut man = SnippetManager::with_config(store, cfg())?;
        assert!(man.import_folder(Some(&src))?);
    }

    {
        let store = FileStore::open_ro_with_config(&db, &cfg())?;
        let man = SnippetManager::with_config(store, cfg())?;
        let all = man.retrieve_all(false)?;
        let got: Vec<(u64, &str, &str)> = all
            .iter()
            .map(|s| (s.slot, s.name.as_str(), s.body.as_str()))
            .collect();
        assert_eq!(got, vec![(0, "a", "a = 1"), (1, "b", "auto b;")]);
        // папка по умолчанию выводится из пути базы
        assert_eq!(man.default_folder()?, root.join(".snippets"));
    }
    Ok(())
}

#[test]
fn index_node_is_attached_not_recreated() -> Result<()> {
    let root = unique_root("attach");
    let db = root.join("p.qsn");

    let first = {
        let man = SnippetManager::with_config(FileStore::create_with_config(&db, &cfg())?, cfg())?;
        man.index().node()
    };
    let man = SnippetManager::with_config(FileStore::open_with_config(&db, &cfg())?, cfg())?;
    assert_eq!(man.index().node(), first);
    assert_eq!(man.store().node_count(), 1);
    Ok(())
}

#[test]
fn second_writer_is_locked_out() -> Result<()> {
    let root = unique_root("lock");
    let db = root.join("p.qsn");
    let _w = FileStore::create_with_config(&db, &cfg())?;
    assert!(lock_file_path(&db).exists());

    assert!(FileStore::open_with_config(&db, &cfg()).is_err());
    assert!(FileStore::open_ro_with_config(&db, &cfg()).is_err());
    Ok(())
}

#[test]
fn create_refuses_existing_and_open_refuses_missing() -> Result<()> {
    let root = unique_root("exist");
    let db = root.join("p.qsn");
    assert!(FileStore::open_with_config(&db, &cfg()).is_err());
    drop(FileStore::create_with_config(&db, &cfg())?);
    assert!(FileStore::create_with_config(&db, &cfg()).is_err());
    assert_eq!(fs::metadata(&db)?.len(), NODES_HDR_SIZE as u64);
    Ok(())
}

#[test]
fn corrupted_store_file_is_rejected() -> Result<()> {
    let root = unique_root("corrupt");
    let db = root.join("p.qsn");
    {
        let mut s = FileStore::create_with_config(&db, &cfg())?;
        let n = s.create_node()?;
        s.set_field(n, 0, "name")?;
        s.flush()?;
    }
    let mut bytes = fs::read(&db)?;
    let last = bytes.len() - 1;
    bytes[last] ^= 0x5A;
    fs::write(&db, &bytes)?;

    let err = match FileStore::open_with_config(&db, &cfg()) {
        Ok(_) => panic!("corrupted file must not open"),
        Err(e) => e,
    };
    assert!(
        matches!(err.downcast_ref::<SnipError>(), Some(SnipError::BadStoreFile { .. })),
        "unexpected error: {err:#}"
    );
    Ok(())
}

#[test]
fn read_only_store_refuses_mutations() -> Result<()> {
    let root = unique_root("ro");
    let db = root.join("p.qsn");
    drop(FileStore::create_with_config(&db, &cfg())?);

    let mut ro = FileStore::open_ro_with_config(&db, &cfg())?;
    assert!(ro.is_readonly());
    assert!(ro.create_node().is_err());
    assert!(!ro.is_dirty());
    ro.flush()?;
    Ok(())
}

#[test]
fn drop_flushes_pending_changes() -> Result<()> {
    let root = unique_root("drop");
    let db = root.join("p.qsn");
    let node = {
        let mut s = FileStore::create_with_config(&db, &cfg())?;
        let n = s.create_node()?;
        s.set_field(n, 1, "Python")?;
        assert!(s.is_dirty());
        n
    };
    let s = FileStore::open_ro_with_config(&db, &cfg())?;
    assert_eq!(s.field(node, 1)?.as_deref(), Some("Python"));
    assert!(!root.join("p.qsn.tmp").exists());
    Ok(())
}

#[test]
fn open_or_create_creates_then_reopens() -> Result<()> {
    let root = unique_root("ooc");
    let db = root.join("p.qsn");
    fs::create_dir_all(&root)?;

    let node = {
        let mut s = FileStore::open_or_create_with_config(&db, &cfg())?;
        assert!(!s.is_readonly());
        let n = s.create_node()?;
        s.set_field(n, 0, "kept")?;
        n
    };
    assert!(db.is_file());

    // второй вызов открывает существующий файл, а не пересоздаёт его
    let s = FileStore::open_or_create_with_config(&db, &cfg())?;
    assert_eq!(s.field(node, 0)?.as_deref(), Some("kept"));
    assert_eq!(s.node_count(), 1);
    Ok(())
}
