use anyhow::Result;

use quiversnip::consts::{BODY_TAG, FIELD_LANG, FIELD_NAME};
use quiversnip::{
    Language, MemStore, NodeStore, SnipConfig, SnipError, Snippet, SnippetManager, NO_NODE,
};

/// Менеджер с тремя сниппетами в слотах 0..2 (как после импорта).
fn seeded() -> Result<SnippetManager<MemStore>> {
    let mut man = SnippetManager::with_config(MemStore::new(), SnipConfig::default())?;
    let idx = man.index().clone();
    let items = [
        (Language::Python, "a", "print('a')"),
        (Language::Idc, "b", "Message(\"b\");"),
        (Language::Python, "c", "c = 3"),
    ];
    for (slot, (lang, name, body)) in items.into_iter().enumerate() {
        let mut s = Snippet::new(lang, name, body);
        s.save(man.store_mut(), slot as u64)?;
        idx.set(man.store_mut(), slot as u64, s.node)?;
    }
    Ok(man)
}

#[test]
fn delete_destroys_the_physical_node() -> Result<()> {
    let mut man = seeded()?;
    let mut b = man.retrieve_all(true)?.remove(1);
    let node = b.node;
    assert!(man.store().contains(node));

    assert!(man.delete(&mut b)?);
    assert_eq!(b.node, NO_NODE, "in-memory handle must be cleared");
    // регрессия: уничтожается исходный узел, а не сентинел
    assert!(!man.store().contains(node), "node {node} must be gone from the store");
    assert_eq!(man.index().get(man.store(), 1)?, None);
    Ok(())
}

#[test]
fn point_delete_leaves_a_gap() -> Result<()> {
    let mut man = seeded()?;
    let mut a = man.retrieve_all(true)?.remove(0);
    man.delete(&mut a)?;

    let slots: Vec<u64> = man.retrieve_all(true)?.iter().map(|s| s.slot).collect();
    assert_eq!(slots, vec![1, 2], "slots are not compacted");
    Ok(())
}

#[test]
fn delete_unsaved_snippet_returns_false() -> Result<()> {
    let mut man = seeded()?;
    let nodes_before = man.store().node_count();
    let mut fresh = Snippet::new(Language::Python, "new", "x");
    assert!(!man.delete(&mut fresh)?);
    assert_eq!(man.store().node_count(), nodes_before);
    assert_eq!(man.count()?, 3);
    Ok(())
}

#[test]
fn delete_twice_is_refused_by_sentinel() -> Result<()> {
    let mut man = seeded()?;
    let mut c = man.retrieve_all(true)?.remove(2);
    assert!(man.delete(&mut c)?);
    assert!(!man.delete(&mut c)?);
    Ok(())
}

#[test]
fn delete_all_clears_index_and_nodes() -> Result<()> {
    let mut man = seeded()?;
    man.delete_all()?;

    assert!(man.retrieve_all(false)?.is_empty());
    assert_eq!(man.index().first(man.store())?, None);
    // остаётся только узел индекса
    assert_eq!(man.store().node_count(), 1);
    Ok(())
}

#[test]
fn retrieve_all_surfaces_dangling_handle() -> Result<()> {
    let mut man = seeded()?;
    let b = man.retrieve_all(true)?.remove(1);
    // повреждаем базу: узел уничтожен, запись индекса осталась
    man.store_mut().destroy_node(b.node)?;

    let err = man.retrieve_all(false).unwrap_err();
    assert!(
        matches!(err.downcast_ref::<SnipError>(), Some(SnipError::UnknownNode(n)) if *n == b.node),
        "unexpected error: {err:#}"
    );
    Ok(())
}

#[test]
fn delete_all_covers_dangling_entries() -> Result<()> {
    let mut man = seeded()?;
    let idx = man.index().clone();
    idx.set(man.store_mut(), 10, 9_999)?; // хэндл, которого нет

    man.delete_all()?;
    assert!(idx.is_empty(man.store())?);
    assert!(man.retrieve_all(true)?.is_empty());
    Ok(())
}

#[test]
fn delete_tolerates_already_destroyed_node() -> Result<()> {
    let mut man = seeded()?;
    let mut a = man.retrieve_all(true)?.remove(0);
    man.store_mut().destroy_node(a.node)?;

    assert!(man.delete(&mut a)?);
    assert_eq!(man.index().get(man.store(), 0)?, None);
    Ok(())
}

#[test]
fn export_aborts_on_unknown_language_tag() -> Result<()> {
    let mut man = seeded()?;
    let idx = man.index().clone();
    let store = man.store_mut();
    let node = store.create_node()?;
    store.set_field(node, FIELD_NAME, "script")?;
    store.set_field(node, FIELD_LANG, "Lua")?;
    store.set_blob(node, BODY_TAG, b"print 1")?;
    idx.set(store, 3, node)?;

    // перечисление и удаление работают и с незнакомым тегом
    let all = man.retrieve_all(true)?;
    assert_eq!(all.len(), 4);
    assert_eq!(all[3].language(), None);

    let out = std::env::temp_dir().join(format!(
        "qsnip-unknown-lang-{}-{}",
        std::process::id(),
        node
    ));
    let (ok, msg) = man.export_folder(Some(&out));
    assert!(!ok);
    assert!(msg.contains("Lua"), "{msg}");

    man.delete_all()?;
    assert_eq!(man.count()?, 0);
    Ok(())
}

#[test]
fn export_aborts_on_path_like_stored_name() -> Result<()> {
    let mut man = seeded()?;
    let idx = man.index().clone();
    let store = man.store_mut();
    let node = store.create_node()?;
    store.set_field(node, FIELD_NAME, "../escaped")?;
    store.set_field(node, FIELD_LANG, Language::Python.tag())?;
    store.set_blob(node, BODY_TAG, b"x = 1")?;
    idx.set(store, 3, node)?;

    let root = std::env::temp_dir().join(format!(
        "qsnip-unsafe-name-{}-{}",
        std::process::id(),
        node
    ));
    let out = root.join("out");
    let (ok, msg) = man.export_folder(Some(&out));
    assert!(!ok);
    assert!(msg.starts_with("Failed to save:"), "{msg}");
    assert!(msg.contains("../escaped"), "{msg}");
    assert!(!root.join("escaped.py").exists());
    // ни одного файла: имена проверяются до записи
    assert!(!out.join("a.py").exists());

    let err = man.try_export_folder(Some(&out)).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SnipError>(),
        Some(SnipError::UnsafeFileName(n)) if n == "../escaped"
    ));
    Ok(())
}
