mod common;

use std::sync::Arc;

use common::{RamDisk, pattern};
use quark::{BLOCK_SIZE, Error, FileKind, FileSystem};

fn fresh_fs(blocks: u32) -> FileSystem<RamDisk> {
    let _ = env_logger::builder().is_test(true).try_init();
    let disk = Arc::new(RamDisk::new(blocks));
    FileSystem::format(Arc::clone(&disk)).unwrap();
    FileSystem::mount(disk, true).unwrap()
}

#[test]
fn end_to_end_scenario() {
    // The whole life of a small volume, start to finish.
    let disk = Arc::new(RamDisk::new(100));
    FileSystem::format(Arc::clone(&disk)).unwrap();
    let fs = FileSystem::mount(disk, true).unwrap();

    let home = fs.make_dir("/home").unwrap();
    assert!(home < fs.superblock().inodes);

    assert_eq!(fs.write_path("/home/f.txt", b"hello", 0).unwrap(), 5);

    let mut buf = [0u8; 5];
    assert_eq!(fs.read_path("/home/f.txt", &mut buf, 0).unwrap(), 5);
    assert_eq!(&buf, b"hello");

    fs.remove_dir("/home").unwrap();
    assert_eq!(
        fs.read_path("/home/f.txt", &mut buf, 0).unwrap_err(),
        Error::NotFound
    );
}

#[test]
fn make_dir_rejects_root_and_duplicates() {
    let fs = fresh_fs(100);
    assert_eq!(fs.make_dir("/").unwrap_err(), Error::InvalidArgument);

    fs.make_dir("/a").unwrap();
    assert_eq!(fs.make_dir("/a").unwrap_err(), Error::AlreadyExists);

    // A file and a directory may share a name; entries are keyed by
    // (name, type).
    fs.write_path("/a.txt", b"x", 0).unwrap();
    fs.make_dir("/a.txt").unwrap();
}

#[test]
fn add_file_rejects_duplicates() {
    let fs = fresh_fs(100);
    fs.add_file_to_directory("/notes").unwrap();
    assert_eq!(fs.add_file_to_directory("/notes").unwrap_err(), Error::AlreadyExists);

    // write_path reuses the existing file instead of duplicating it.
    fs.write_path("/notes", b"one", 0).unwrap();
    fs.write_path("/notes", b"two", 0).unwrap();

    let hits = fs
        .read_dir("/")
        .unwrap()
        .iter()
        .filter(|e| e.name_eq(b"notes") && e.kind == FileKind::File)
        .count();
    assert_eq!(hits, 1);
}

#[test]
fn missing_parent_is_not_found() {
    let fs = fresh_fs(100);
    assert_eq!(fs.make_dir("/x/y").unwrap_err(), Error::NotFound);
    assert_eq!(fs.write_path("/x/y.txt", b"hi", 0).unwrap_err(), Error::NotFound);
    let mut buf = [0u8; 1];
    assert_eq!(fs.read_path("/x/y.txt", &mut buf, 0).unwrap_err(), Error::NotFound);
}

#[test]
fn lookup_distinguishes_kinds() {
    let fs = fresh_fs(100);
    fs.write_path("/f", b"data", 0).unwrap();

    // A file does not resolve as a directory, nor as an intermediate
    // path component.
    assert_eq!(fs.read_dir("/f").unwrap_err(), Error::NotFound);
    let mut buf = [0u8; 4];
    assert_eq!(fs.read_path("/f/inner", &mut buf, 0).unwrap_err(), Error::NotFound);
}

#[test]
fn long_names_are_rejected() {
    let fs = fresh_fs(100);
    assert_eq!(
        fs.make_dir("/this_name_is_way_too_long").unwrap_err(),
        Error::InvalidFileName
    );
    assert_eq!(fs.stats().unwrap().inodes_used, 1); // nothing leaked
}

#[test]
fn nested_tree_reads_back() {
    let fs = fresh_fs(200);
    fs.make_dir("/a").unwrap();
    fs.make_dir("/a/b").unwrap();
    fs.make_dir("/a/b/c").unwrap();

    let payload = pattern(2 * BLOCK_SIZE + 9);
    fs.write_path("/a/b/c/deep.bin", &payload, 0).unwrap();
    fs.write_path("/a/top.txt", b"top", 0).unwrap();

    let mut back = vec![0u8; payload.len()];
    assert_eq!(fs.read_path("/a/b/c/deep.bin", &mut back, 0).unwrap(), payload.len());
    assert_eq!(back, payload);

    let mut buf = [0u8; 3];
    fs.read_path("/a/top.txt", &mut buf, 0).unwrap();
    assert_eq!(&buf, b"top");
}

#[test]
fn remove_dir_reclaims_whole_subtree() {
    let fs = fresh_fs(200);
    let baseline = fs.stats().unwrap();

    fs.make_dir("/a").unwrap();
    fs.make_dir("/a/sub").unwrap();
    fs.make_dir("/a/sub/deeper").unwrap();
    fs.write_path("/a/one.bin", &pattern(3 * BLOCK_SIZE), 0).unwrap();
    fs.write_path("/a/sub/two.bin", &pattern(7 * BLOCK_SIZE), 0).unwrap();
    fs.write_path("/a/sub/deeper/three.txt", b"3", 0).unwrap();

    let populated = fs.stats().unwrap();
    assert!(populated.inodes_used > baseline.inodes_used);
    assert!(populated.data_blocks_used > baseline.data_blocks_used);

    fs.remove_dir("/a").unwrap();

    // Every inode and data block of the subtree is free again and the
    // tree no longer resolves.
    let after = fs.stats().unwrap();
    assert_eq!(after.inodes_used, baseline.inodes_used);
    assert_eq!(after.data_blocks_used, baseline.data_blocks_used);
    assert_eq!(fs.read_dir("/a").unwrap_err(), Error::NotFound);
    let mut buf = [0u8; 1];
    assert_eq!(
        fs.read_path("/a/sub/two.bin", &mut buf, 0).unwrap_err(),
        Error::NotFound
    );

    // Siblings are untouched by the removal.
    fs.make_dir("/b").unwrap();
    fs.write_path("/b/still.txt", b"ok", 0).unwrap();
    fs.remove_dir("/a").unwrap_err();
    let mut buf = [0u8; 2];
    fs.read_path("/b/still.txt", &mut buf, 0).unwrap();
}

#[test]
fn remove_dir_of_missing_path_fails() {
    let fs = fresh_fs(100);
    assert_eq!(fs.remove_dir("/ghost").unwrap_err(), Error::NotFound);
}

#[test]
fn remove_file_leaves_directory_entry_behind() {
    // remove_file frees storage but does not touch the owning
    // directory's content; the stale entry stays until a directory
    // operation filters it out.
    let fs = fresh_fs(100);
    fs.write_path("/orphan.txt", b"data", 0).unwrap();
    let inumber = quark::name_to_inode(
        &*fs.device(),
        fs.superblock(),
        "/orphan.txt",
        FileKind::File,
    )
    .unwrap();

    fs.remove_file(inumber).unwrap();

    let still_listed = fs
        .read_dir("/")
        .unwrap()
        .iter()
        .any(|e| e.name_eq(b"orphan.txt"));
    assert!(still_listed);

    // The entry resolves, but the inode behind it is gone.
    let mut buf = [0u8; 4];
    assert_eq!(
        fs.read_path("/orphan.txt", &mut buf, 0).unwrap_err(),
        Error::InvalidArgument
    );
}

#[test]
fn reinit_root_discards_contents() {
    let disk = Arc::new(RamDisk::new(100));
    FileSystem::format(Arc::clone(&disk)).unwrap();
    let fs = FileSystem::mount(Arc::clone(&disk), true).unwrap();
    fs.make_dir("/old").unwrap();
    fs.write_path("/old/f", b"x", 0).unwrap();
    drop(fs);

    // Remounting with init_root wipes the old root listing.
    let fs = FileSystem::mount(disk, true).unwrap();
    assert!(fs.read_dir("/").unwrap().is_empty());
    assert_eq!(fs.read_dir("/old").unwrap_err(), Error::NotFound);
}
