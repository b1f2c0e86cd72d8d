//! Integration tests for the path-addressed adapter.
//!
//! The fixture mirrors a real Fish-disk image: `README.list49` at the root,
//! `Plot/plot.c`, and `Polygon/iffwriter/iffwriter.h`.

use std::io::Cursor;

use adffs_core::{
    dir_ops, file_ops, load_volume_pack, readlink, rename, resolve, save_volume_pack,
    set_permissions, stat, AdfError, AdfMount, DentryKind, MemoryVolume, Volume, MODE_DIR, MODE_FILE,
};

fn fixture() -> AdfMount<MemoryVolume> {
    let mut vol = MemoryVolume::new("ffdisk0049");
    vol.add_file_path("README.list49", b"disk 49 index\n".to_vec());
    vol.add_file_path("Plot/plot.c", b"int main(){}\n".to_vec());
    vol.add_file_path("Polygon/iffwriter/iffwriter.h", b"#pragma once\n".to_vec());
    AdfMount::new(vol)
}

#[test]
fn test_resolve_is_cursor_neutral() {
    let mut m = fixture();
    m.chdir("/Plot").unwrap();

    let d = resolve(&mut m, "/Polygon/iffwriter/iffwriter.h")
        .unwrap()
        .unwrap();
    assert_eq!(d.kind, DentryKind::File);
    assert_eq!(m.cwd(), "/Plot");

    // failed lookups restore the cursor too
    assert!(resolve(&mut m, "/Polygon/nosuch/x").unwrap().is_none());
    assert_eq!(m.cwd(), "/Plot");
}

#[test]
fn test_root_resolution_without_cursor_movement() {
    let mut m = fixture();
    m.chdir("/Polygon").unwrap();
    let d = resolve(&mut m, "/").unwrap().unwrap();
    assert!(d.is_dir());
    assert_eq!(d.name(), "ffdisk0049");
    assert_eq!(m.cwd(), "/Polygon");
}

#[test]
fn test_relative_resolution_after_chdir() {
    let mut m = fixture();
    m.chdir("/Plot").unwrap();
    let d = resolve(&mut m, "plot.c").unwrap().unwrap();
    assert_eq!(d.kind, DentryKind::File);
    assert_eq!(m.cwd(), "/Plot");
}

#[test]
fn test_chdir_case_insensitive_with_case_preserving_cwd() {
    let mut m = fixture();
    m.chdir("plot").unwrap();
    assert_eq!(m.cwd(), "/plot");
    let d = resolve(&mut m, "plot.c").unwrap().unwrap();
    assert_eq!(d.kind, DentryKind::File);
}

#[test]
fn test_leaf_lookup_is_case_sensitive() {
    let mut m = fixture();
    assert!(resolve(&mut m, "/Plot/Plot.c").unwrap().is_none());
}

#[test]
fn test_chdir_failure_leaves_cursor_in_place() {
    let mut m = fixture();
    m.chdir("/Plot").unwrap();
    let err = m.chdir("/Polygon/missing/deeper").unwrap_err();
    assert!(matches!(err, AdfError::NotFound(_)));
    assert_eq!(m.cwd(), "/Plot");
}

#[test]
fn test_read_boundaries() {
    let mut m = fixture();
    let mut buf = [0u8; 32];

    // whole file
    let n = file_ops::read(&mut m, "/README.list49", 0, &mut buf).unwrap();
    assert_eq!(&buf[..n], b"disk 49 index\n");

    // short read near the end
    let n = file_ops::read(&mut m, "/README.list49", 12, &mut buf).unwrap();
    assert_eq!(n, 2);

    // exactly at the end and past it: zero bytes, not an error
    let n = file_ops::read(&mut m, "/README.list49", 14, &mut buf).unwrap();
    assert_eq!(n, 0);
    let n = file_ops::read(&mut m, "/README.list49", 500, &mut buf).unwrap();
    assert_eq!(n, 0);
}

#[test]
fn test_reads_do_not_move_the_cursor() {
    let mut m = fixture();
    m.chdir("/Polygon").unwrap();
    let data = file_ops::read_all(&mut m, "/Plot/plot.c").unwrap();
    assert_eq!(data, b"int main(){}\n");
    assert_eq!(m.cwd(), "/Polygon");
}

#[test]
fn test_write_then_read_back() {
    let mut m = fixture();
    let n = file_ops::write(&mut m, "/Plot/plot.c", 4, b"work").unwrap();
    assert_eq!(n, 4);
    let data = file_ops::read_all(&mut m, "/Plot/plot.c").unwrap();
    assert_eq!(data, b"int work(){}\n");
}

#[test]
fn test_mutations_return_cursor_to_root() {
    let mut m = fixture();
    m.chdir("/Polygon").unwrap();
    dir_ops::create_dir(&mut m, "/Plot/out", 0o755).unwrap();
    assert_eq!(m.cwd(), "/");

    dir_ops::create_file(&mut m, "/Plot/out/notes.txt", 0o644).unwrap();
    file_ops::write(&mut m, "/Plot/out/notes.txt", 0, b"hello").unwrap();
    assert_eq!(
        file_ops::read_all(&mut m, "/Plot/out/notes.txt").unwrap(),
        b"hello"
    );

    dir_ops::remove(&mut m, "/Plot/out/notes.txt").unwrap();
    dir_ops::remove(&mut m, "/Plot/out").unwrap();
    assert!(resolve(&mut m, "/Plot/out").unwrap().is_none());
    assert_eq!(m.cwd(), "/");
}

#[test]
fn test_stat_file_and_directory() {
    let mut m = fixture();
    let md = stat(&mut m, "/README.list49").unwrap();
    assert_eq!(md.mode & MODE_FILE, MODE_FILE);
    assert_eq!(md.size, 14);

    let md = stat(&mut m, "/Polygon").unwrap();
    assert_eq!(md.mode & MODE_DIR, MODE_DIR);
    assert_eq!(md.size, 1); // one entry: iffwriter

    let md = stat(&mut m, "/").unwrap();
    assert_eq!(md.mode & 0o777, 0o755);
    assert_eq!(md.size, 3);
}

#[test]
fn test_permission_round_trip_through_stat() {
    let mut m = fixture();
    set_permissions(&mut m, "/Plot/plot.c", 0o400).unwrap();
    let md = stat(&mut m, "/Plot/plot.c").unwrap();
    assert_eq!(md.mode & 0o700, 0o400);

    set_permissions(&mut m, "/Plot/plot.c", 0o755).unwrap();
    let md = stat(&mut m, "/Plot/plot.c").unwrap();
    assert_eq!(md.mode & 0o777, 0o755);
}

#[test]
fn test_rename_with_parent_notation() {
    let mut m = fixture();
    // host-style parent reference in the source path
    rename(
        &mut m,
        "/Polygon/iffwriter/../iffwriter/iffwriter.h",
        "/Plot/iffwriter.h",
    )
    .unwrap();
    assert!(resolve(&mut m, "/Plot/iffwriter.h").unwrap().is_some());
    assert!(resolve(&mut m, "/Polygon/iffwriter/iffwriter.h")
        .unwrap()
        .is_none());
}

#[test]
fn test_rename_rejects_boot_area_parents() {
    let mut vol = MemoryVolume::new("broken");
    vol.add_file_path("README.list49", b"disk 49 index\n".to_vec());
    vol.add_link_dir("dangling", 0);
    let mut m = AdfMount::new(vol);

    let err = rename(&mut m, "/README.list49", "/dangling/README").unwrap_err();
    assert!(matches!(err, AdfError::IoFault(_)));
    // no mutation happened
    assert!(resolve(&mut m, "/README.list49").unwrap().is_some());
}

#[test]
fn test_readlink_soft_and_hard() {
    let mut vol = MemoryVolume::new("links");
    vol.add_file_path("Plot/plot.c", b"int main(){}\n".to_vec());
    let real = vol.sector_of("Plot/plot.c").unwrap();
    vol.add_soft_link("Plot/src", "plot.c");
    vol.add_link_file("plot-main", real);
    let mut m = AdfMount::new(vol);

    assert_eq!(readlink(&mut m, "/Plot/src").unwrap(), "plot.c");
    assert_eq!(readlink(&mut m, "/plot-main").unwrap(), "plot.c");
}

#[test]
fn test_unknown_entries_are_listed_but_not_stattable() {
    let mut vol = MemoryVolume::new("odd");
    vol.add_file_path("README.list49", b"disk 49 index\n".to_vec());
    vol.add_unknown_entry("odd", 77);
    let mut m = AdfMount::new(vol);

    let entries = dir_ops::list(&mut m, "/").unwrap();
    assert!(entries
        .iter()
        .any(|d| d.raw.name == "odd" && d.kind == DentryKind::Unknown));
    assert!(matches!(
        stat(&mut m, "/odd"),
        Err(AdfError::Unsupported(_))
    ));
}

#[test]
fn test_read_only_volume() {
    let mut vol = MemoryVolume::new("locked");
    vol.add_file_path("a.txt", b"aaa".to_vec());
    vol.set_read_only(true);
    let mut m = AdfMount::new(vol);

    assert!(file_ops::read_all(&mut m, "/a.txt").is_ok());
    assert!(matches!(
        file_ops::write(&mut m, "/a.txt", 0, b"b"),
        Err(AdfError::ReadOnly)
    ));
    assert!(matches!(
        dir_ops::create_dir(&mut m, "/d", 0o755),
        Err(AdfError::ReadOnly)
    ));
    assert!(matches!(
        dir_ops::remove(&mut m, "/a.txt"),
        Err(AdfError::ReadOnly)
    ));
}

#[test]
fn test_pack_round_trip_preserves_tree_and_edits() {
    let mut m = fixture();
    dir_ops::create_dir(&mut m, "/Build", 0o755).unwrap();
    dir_ops::create_file(&mut m, "/Build/out.log", 0o644).unwrap();
    file_ops::write(&mut m, "/Build/out.log", 0, b"ok\n").unwrap();
    rename(&mut m, "/README.list49", "/README").unwrap();

    let mut buf = Cursor::new(Vec::new());
    save_volume_pack(&mut m, &mut buf).unwrap();
    buf.set_position(0);
    let mut reloaded = AdfMount::new(load_volume_pack(buf, "x").unwrap());

    assert_eq!(reloaded.volume().info().name, "ffdisk0049");
    assert_eq!(
        file_ops::read_all(&mut reloaded, "/Build/out.log").unwrap(),
        b"ok\n"
    );
    assert!(resolve(&mut reloaded, "/README").unwrap().is_some());
    assert!(resolve(&mut reloaded, "/README.list49").unwrap().is_none());
    assert_eq!(
        file_ops::read_all(&mut reloaded, "/Polygon/iffwriter/iffwriter.h").unwrap(),
        b"#pragma once\n"
    );
}
