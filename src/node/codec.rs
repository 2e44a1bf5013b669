// src/node/codec.rs
//
// Формат файла хранилища (LE):
// header (NODES_HDR_SIZE = 32):
//   MAGIC8 = "QSNODES1"
//   u32 version     = 1
//   u32 node_count
//   u64 next_node
//   u32 crc32       (crc32fast по payload)
//   u32 reserved    = 0
// payload, на каждый узел:
//   u64 id
//   u32 name_len + bytes              (0 = безымянный)
//   u32 field_count × { u32 idx, u32 len, bytes }
//   u32 blob_count  × { u8 tag, u32 chunk_count, chunk_count*BLOB_CHUNK bytes }
//   u32 entry_count × { u64 key, u64 value }

use anyhow::{anyhow, Result};
use byteorder::{ByteOrder, LittleEndian, ReadBytesExt, WriteBytesExt};
use crc32fast::Hasher as Crc32;
use std::collections::BTreeMap;
use std::io::{Cursor, Read};

use crate::consts::{BLOB_CHUNK, NODES_HDR_SIZE, NODES_MAGIC, NODES_VERSION, NO_NODE};

use super::mem::{MemStore, Node};
use super::NodeStore;

/// Сериализовать таблицу целиком: header + payload.
pub fn encode(store: &MemStore) -> Result<Vec<u8>> {
    let mut payload = Vec::new();
    for (id, node) in store.nodes() {
        payload.write_u64::<LittleEndian>(id)?;

        let name = node.name.as_deref().unwrap_or("");
        write_bytes(&mut payload, name.as_bytes())?;

        payload.write_u32::<LittleEndian>(node.fields.len() as u32)?;
        for (idx, value) in &node.fields {
            payload.write_u32::<LittleEndian>(*idx)?;
            write_bytes(&mut payload, value.as_bytes())?;
        }

        payload.write_u32::<LittleEndian>(node.blobs.len() as u32)?;
        for (tag, data) in &node.blobs {
            if data.len() % BLOB_CHUNK != 0 {
                return Err(anyhow!(
                    "node {}: blob '{}' is not chunk-aligned ({} B)",
                    id,
                    *tag as char,
                    data.len()
                ));
            }
            payload.write_u8(*tag)?;
            payload.write_u32::<LittleEndian>((data.len() / BLOB_CHUNK) as u32)?;
            payload.extend_from_slice(data);
        }

        payload.write_u32::<LittleEndian>(node.index.len() as u32)?;
        for (k, v) in &node.index {
            payload.write_u64::<LittleEndian>(*k)?;
            payload.write_u64::<LittleEndian>(*v)?;
        }
    }

    let mut out = Vec::with_capacity(NODES_HDR_SIZE + payload.len());
    out.extend_from_slice(NODES_MAGIC);
    out.write_u32::<LittleEndian>(NODES_VERSION)?;
    out.write_u32::<LittleEndian>(store.node_count() as u32)?;
    out.write_u64::<LittleEndian>(store.next_node())?;
    out.write_u32::<LittleEndian>(payload_crc(&payload))?;
    out.write_u32::<LittleEndian>(0)?; // reserved
    out.extend_from_slice(&payload);
    Ok(out)
}

/// Разобрать файл хранилища. Ошибка — строка-причина; путь добавляет вызывающий.
pub fn decode(buf: &[u8]) -> std::result::Result<MemStore, String> {
    if buf.len() < NODES_HDR_SIZE {
        return Err(format!("file too short ({} B)", buf.len()));
    }
    if &buf[0..8] != NODES_MAGIC {
        return Err("bad magic".to_string());
    }
    let version = LittleEndian::read_u32(&buf[8..12]);
    if version != NODES_VERSION {
        return Err(format!("unsupported version {}", version));
    }
    let node_count = LittleEndian::read_u32(&buf[12..16]);
    let next_node = LittleEndian::read_u64(&buf[16..24]);
    let stored_crc = LittleEndian::read_u32(&buf[24..28]);

    let payload = &buf[NODES_HDR_SIZE..];
    let calc = payload_crc(payload);
    if calc != stored_crc {
        return Err(format!("CRC mismatch (stored={}, calc={})", stored_crc, calc));
    }

    let mut cur = Cursor::new(payload);
    let mut nodes = BTreeMap::new();
    for _ in 0..node_count {
        let (id, node) = read_node(&mut cur).map_err(|e| format!("truncated payload: {e}"))?;
        if id == NO_NODE || id >= next_node {
            return Err(format!("node id {} out of range (next_node={})", id, next_node));
        }
        if nodes.insert(id, node).is_some() {
            return Err(format!("duplicate node id {}", id));
        }
    }
    if (cur.position() as usize) != payload.len() {
        return Err(format!(
            "{} trailing byte(s) after {} node(s)",
            payload.len() - cur.position() as usize,
            node_count
        ));
    }

    Ok(MemStore::from_parts(nodes, next_node))
}

fn read_node(cur: &mut Cursor<&[u8]>) -> std::io::Result<(u64, Node)> {
    let id = cur.read_u64::<LittleEndian>()?;
    let mut node = Node::default();

    let name = read_string(cur)?;
    if !name.is_empty() {
        node.name = Some(name);
    }

    let fields = cur.read_u32::<LittleEndian>()?;
    for _ in 0..fields {
        let idx = cur.read_u32::<LittleEndian>()?;
        node.fields.insert(idx, read_string(cur)?);
    }

    let blobs = cur.read_u32::<LittleEndian>()?;
    for _ in 0..blobs {
        let tag = cur.read_u8()?;
        let chunks = cur.read_u32::<LittleEndian>()? as usize;
        let len = chunks.checked_mul(BLOB_CHUNK).ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("blob '{}' chunk count {} overflows", tag as char, chunks),
            )
        })?;
        let left = remaining(cur);
        if len > left {
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("blob '{}' of {} B exceeds remaining {} B", tag as char, len, left),
            ));
        }
        let mut data = vec![0u8; len];
        cur.read_exact(&mut data)?;
        node.blobs.insert(tag, data);
    }

    let entries = cur.read_u32::<LittleEndian>()?;
    for _ in 0..entries {
        let k = cur.read_u64::<LittleEndian>()?;
        let v = cur.read_u64::<LittleEndian>()?;
        node.index.insert(k, v);
    }
    Ok((id, node))
}

fn write_bytes(out: &mut Vec<u8>, bytes: &[u8]) -> std::io::Result<()> {
    out.write_u32::<LittleEndian>(bytes.len() as u32)?;
    out.extend_from_slice(bytes);
    Ok(())
}

fn read_string(cur: &mut Cursor<&[u8]>) -> std::io::Result<String> {
    let len = cur.read_u32::<LittleEndian>()? as usize;
    let left = remaining(cur);
    if len > left {
        return Err(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            format!("string of {} B exceeds remaining {} B", len, left),
        ));
    }
    let mut bytes = vec![0u8; len];
    cur.read_exact(&mut bytes)?;
    String::from_utf8(bytes).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

fn remaining(cur: &Cursor<&[u8]>) -> usize {
    cur.get_ref().len().saturating_sub(cur.position() as usize)
}

fn payload_crc(payload: &[u8]) -> u32 {
    let mut hasher = Crc32::new();
    hasher.update(payload);
    hasher.finalize()
}
