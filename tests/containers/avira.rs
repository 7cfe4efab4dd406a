use crate::common::builders::*;
use unquarantine::config::DEFAULT_MULTIPART_PART;
use unquarantine::formats::avira;
use unquarantine::{report, ExtractConfig, QuarantineError, RecordKind, Vendor};

#[test]
fn test_qua_file_decoding() {
    let plain: Vec<u8> = (0..300u32).map(|i| (i * 7) as u8).collect();
    let data = qua_file(
        "TR/Crypt.XPACK.Gen",
        "\\\\.\\C:\\Users\\alice\\AppData\\Local\\Temp\\setup.exe",
        "Detected on access",
        200,
        &plain,
    );
    assert_eq!(&data[..11], b"AntiVir Qua");

    let record = avira::extract(&data).unwrap();
    assert_eq!(record.vendor, Vendor::Avira);
    assert_eq!(record.kind, RecordKind::Submit);
    assert_eq!(record.signature.as_deref(), Some("TR/Crypt.XPACK.Gen"));
    assert_eq!(
        record.path.as_deref(),
        Some("C:\\Users\\alice\\AppData\\Local\\Temp\\setup.exe")
    );
    assert_eq!(record.info.as_deref(), Some("Detected on access"));

    // The sample starts inside the path string; the decoder still takes
    // everything from the offset onward.
    let expected: Vec<u8> = data[200..].iter().map(|b| b ^ 0xAA).collect();
    assert_eq!(record.recovered_sample(), Some(&expected[..]));
    assert_eq!(expected.len(), plain.len());
    assert_eq!(expected[expected.len() - 16..], plain[plain.len() - 16..]);
}

#[test]
fn test_sample_after_header_matches_plaintext() {
    let plain = b"MZ\x90\x00\x03\x00\x00\x00\x04\x00".to_vec();
    let data = qua_file("TR/Gen", "C:\\x.exe", "i", 0x200, &plain);
    let record = avira::extract(&data).unwrap();
    assert_eq!(record.recovered_sample(), Some(&plain[..]));
}

#[test]
fn test_path_without_device_prefix_is_unchanged() {
    let data = qua_file("W32/Virut", "D:\\share\\a.scr", "", 0x180, b"x");
    let record = avira::decode(&data).unwrap();
    assert_eq!(record.path.as_deref(), Some("D:\\share\\a.scr"));
    assert_eq!(record.info.as_deref(), Some(""));
}

#[test]
fn test_sample_offset_past_end_gives_empty_sample() {
    let mut data = qua_file("Sig", "C:\\x", "i", 0x180, b"");
    data[0x10..0x14].copy_from_slice(&0x10000u32.to_le_bytes());
    let record = avira::extract(&data).unwrap();
    assert_eq!(record.recovered_sample(), Some(&[][..]));
}

#[test]
fn test_short_qua_is_truncated() {
    let data = qua_file("Sig", "C:\\x", "i", 0x180, b"abc");
    let err = avira::decode(&data[..0x50]).unwrap_err();
    assert!(matches!(err, QuarantineError::Truncated { .. }));

    let err = avira::decode(b"AntiVir Quu").unwrap_err();
    assert!(matches!(err, QuarantineError::InvalidFormat { .. }));
}

#[test]
fn test_multipart_submission() {
    let plain = b"MZ\x90\x00\x03\x00\x00\x00payload".to_vec();
    let qua = qua_file("TR/Agent", "\\\\.\\C:\\tmp\\agent.exe", "note", 0x200, &plain);
    let archive = zip_archive(&[("quarantine.qua", &qua[..]), ("ignored.txt", &b"second"[..])]);

    let config = ExtractConfig::default();
    let body = multipart_body(
        &config.multipart_boundary,
        &[("comment", &b"hello"[..]), (DEFAULT_MULTIPART_PART, &archive[..])],
    );

    let record = avira::decode_submission(&body, &config).unwrap();
    assert_eq!(record.path.as_deref(), Some("C:\\tmp\\agent.exe"));
    assert_eq!(record.recovered_sample(), Some(&plain[..]));

    let dir = tempfile::tempdir().unwrap();
    let written = report::write_outputs(&record, dir.path(), None).unwrap();
    assert_eq!(written.len(), 2);
    assert_eq!(std::fs::read(dir.path().join("agent.exe")).unwrap(), plain);
    assert_eq!(
        std::fs::read_to_string(dir.path().join("agent.exe.info")).unwrap(),
        "signature: TR/Agent\npath: C:\\tmp\\agent.exe\ninfo: note\n"
    );
}

#[test]
fn test_multipart_missing_part() {
    let config = ExtractConfig::default();
    let body = multipart_body(&config.multipart_boundary, &[("comment", &b"hello"[..])]);
    let err = avira::decode_submission(&body, &config).unwrap_err();
    assert!(matches!(err, QuarantineError::Envelope(_)));
}
