use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs;
use std::io::{self, Read, Write};
use unarc_archive::open_archive;
use unarc_core::{SplitVolumeManager, VolumeManager};

/// Hands out at most one byte per read, like a slow pipe.
struct Trickle<R>(R);

impl<R: Read> Read for Trickle<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(1);
        self.0.read(&mut buf[..n])
    }
}

fn tar_header(name: &str, size: usize) -> [u8; 512] {
    let mut block = [0u8; 512];
    block[..name.len()].copy_from_slice(name.as_bytes());
    block[100..108].copy_from_slice(b"0000644\0");
    block[124..136].copy_from_slice(format!("{:011o}\0", size).as_bytes());
    block[136..148].copy_from_slice(b"14524770400\0");
    block[148..156].copy_from_slice(b"        ");
    block[156] = b'0';
    block[257..263].copy_from_slice(b"ustar\0");
    block[263..265].copy_from_slice(b"00");
    let sum: u32 = block.iter().map(|&b| b as u32).sum();
    block[148..156].copy_from_slice(format!("{:06o}\0 ", sum).as_bytes());
    block
}

fn tar_of(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut out = Vec::new();
    for (name, data) in files {
        out.extend_from_slice(&tar_header(name, data.len()));
        out.extend_from_slice(data);
        out.resize(out.len().div_ceil(512) * 512, 0);
    }
    out.extend_from_slice(&[0u8; 1024]);
    out
}

fn read_everything(reader: impl Read + 'static) -> Vec<(String, Vec<u8>)> {
    let mut handle = open_archive(reader).unwrap();
    let mut seen = Vec::new();
    while let Some(entry) = handle.next_entry().unwrap() {
        let mut data = Vec::new();
        handle.entry_reader().unwrap().read_to_end(&mut data).unwrap();
        seen.push((entry.name, data));
    }
    handle.close().unwrap();
    seen
}

#[test]
fn test_tar_across_split_volumes() {
    let body = "spanning several parts ".repeat(120);
    let tar = tar_of(&[("one.txt", body.as_bytes()), ("two.txt", &b"second"[..])]);

    let dir = tempfile::tempdir().unwrap();
    for (i, chunk) in tar.chunks(1000).enumerate() {
        fs::write(dir.path().join(format!("set.tar.{:03}", i + 1)), chunk).unwrap();
    }

    let volumes = SplitVolumeManager::discover(&dir.path().join("set.tar.001")).unwrap();
    assert!(volumes.location().contains("set.tar.001"));

    let seen = read_everything(volumes.open_volumes().unwrap());
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].0, "one.txt");
    assert_eq!(seen[0].1, body.as_bytes());
    assert_eq!(seen[1], ("two.txt".to_string(), b"second".to_vec()));
}

#[test]
fn test_tar_gz_through_one_byte_reads() {
    let tar = tar_of(&[("a.txt", &b"alpha"[..]), ("b.txt", &b"beta"[..])]);
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&tar).unwrap();
    let gz = encoder.finish().unwrap();

    let seen = read_everything(Trickle(io::Cursor::new(gz)));
    let names: Vec<_> = seen.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["a.txt", "b.txt"]);
    assert_eq!(seen[1].1, b"beta");
}
