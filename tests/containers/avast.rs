use crate::common::builders::*;
use crate::common::test_utils::test_keystream;
use unquarantine::formats::avast::{self, FieldValue, Tag, AVAST_MAGIC};
use unquarantine::{report, QuarantineError, RecordKind, Vendor};

#[test]
fn test_wrong_magic_rejected() {
    let data = b"\x00\x00\x00\x00NAME\x04\x00\x00\x00a\x00\x00\x00";
    let err = avast::decode(data).unwrap_err();
    assert!(matches!(err, QuarantineError::InvalidFormat { .. }));
    assert!(!avast::has_magic(data));
}

#[test]
fn test_name_field_decodes_utf16() {
    let data = avast_container(&[text_field(b"NAME", "sample")]);
    let fields: Vec<_> = avast::walk_fields(&data)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].tag, Tag::Name);
    assert_eq!(fields[0].value.as_text(), Some("sample"));

    let record = avast::decode(&data).unwrap();
    assert_eq!(record.name.as_deref(), Some("sample"));
}

#[test]
fn test_size_field_widths() {
    let data = avast_container(&[
        field(b"SIZE", &0x1234u32.to_le_bytes()),
        field(b"SIZE", &0x1_0000_0000u64.to_le_bytes()),
    ]);
    let values: Vec<_> = avast::walk_fields(&data)
        .unwrap()
        .map(|f| f.unwrap().value.as_integer())
        .collect();
    assert_eq!(values, vec![Some(0x1234), Some(0x1_0000_0000)]);

    let data = avast_container(&[field(b"SIZE", &[1, 2])]);
    let err = avast::decode(&data).unwrap_err();
    assert!(matches!(
        err,
        QuarantineError::UnsupportedField { ref tag, size: 2 } if tag == "SIZE"
    ));
}

#[test]
fn test_type_classification() {
    let cases = [
        ("Submit_v2", RecordKind::Submit),
        ("Submit", RecordKind::Submit),
        ("VirusDlgStat", RecordKind::Stat),
        ("HeurSuspicious", RecordKind::Heuristic),
        ("Telemetry", RecordKind::Unknown),
    ];
    for (value, expected) in cases {
        let record = avast::decode(&avast_container(&[text_field(b"TYPE", value)])).unwrap();
        assert_eq!(record.kind, expected, "TYPE {value}");
    }
}

#[test]
fn test_unknown_tags_kept_raw() {
    let data = avast_container(&[field(b"XTRA", &[0xde, 0xad]), text_field(b"NAME", "n")]);
    let fields: Vec<_> = avast::walk_fields(&data)
        .unwrap()
        .map(|f| f.unwrap())
        .collect();
    assert_eq!(fields[0].tag, Tag::Other(*b"XTRA"));
    assert_eq!(fields[0].value, FieldValue::Raw(&[0xde, 0xad]));
    assert_eq!(fields[1].offset, AVAST_MAGIC.len() + 10);
}

#[test]
fn test_truncated_field_is_error() {
    let mut data = avast_container(&[field(b"DATA", &[0u8; 16])]);
    data.truncate(data.len() - 4);
    let err = avast::decode(&data).unwrap_err();
    assert!(matches!(err, QuarantineError::Truncated { .. }));
}

#[test]
fn test_submit_container_round_trip() {
    let keystream = test_keystream();
    let plain: Vec<u8> = (0..20_000u32).map(|i| (i % 251) as u8).collect();
    let digest = [0x11u8; 32];

    let scan_report = "Original file location: C:\\Users\\bob\\Downloads\\invoice.exe\r\n\
                       Virus name: Win32:Trojan-gen\r\n\
                       Windows 10 Enterprise 19045 ";
    let meta = [
        meta_entry(0x00, b"C:\\Users\\bob\\Downloads\\invoice.exe\0"),
        meta_entry(0x19, &digest),
    ]
    .concat();

    let data = avast_container(&[
        text_field(b"GUID", "ignored"),
        text_field(b"TYPE", "Submit_v2"),
        text_field(b"SCOO", scan_report),
        htyp_field(b"SHA256\0\0", &digest),
        meta_field(&meta),
        field(b"DATA", &keystream.apply(&plain)),
    ]);

    let record = avast::extract(&data, &keystream).unwrap();
    assert_eq!(record.vendor, Vendor::AvastAvg);
    assert_eq!(record.kind, RecordKind::Submit);
    assert_eq!(
        record.path.as_deref(),
        Some("C:\\Users\\bob\\Downloads\\invoice.exe")
    );
    assert_eq!(record.signature.as_deref(), Some("Win32:Trojan-gen"));
    assert_eq!(record.os.as_deref(), Some("Windows 10 Enterprise 19045"));
    let hash = record.hash.as_ref().unwrap();
    assert_eq!(hash.algorithm, "SHA256\0\0");
    assert_eq!(hash.hex_digest, "11".repeat(32));
    assert_eq!(
        record.meta_path.as_deref(),
        Some("C:\\Users\\bob\\Downloads\\invoice.exe")
    );
    assert_eq!(record.meta_hash.as_ref().unwrap().algorithm, "SHA256HASH");
    assert_eq!(record.recovered_sample(), Some(&plain[..]));
}

#[test]
fn test_stat_container_writes_stat_report() {
    let data = avast_container(&[
        text_field(b"TYPE", "VirusDlgStat"),
        text_field(b"VIRU", "Win32:Stat-A"),
        text_field(b"NAME", "C:\\Windows\\Temp\\dropper.dll"),
        htyp_field(b"MD5\0\0", &[0xaa, 0xbb]),
        field(b"DATA", b"not kept"),
    ]);
    let record = avast::decode(&data).unwrap();
    assert!(record.sample.is_none());
    assert!(record.is_extractable());

    let dir = tempfile::tempdir().unwrap();
    let written = report::write_outputs(&record, dir.path(), None).unwrap();
    assert_eq!(written, vec![dir.path().join("dropper.dll.stat")]);
    let text = std::fs::read_to_string(&written[0]).unwrap();
    assert_eq!(
        text,
        "signature: Win32:Stat-A\npath: C:\\Windows\\Temp\\dropper.dll\nhash: MD5\0\0:aabb\n"
    );
}

#[test]
fn test_heuristic_container_writes_heur_report() {
    let digest = [0x42u8; 32];
    let meta = [
        meta_entry(0x00, b"C:\\scripts\\loader.js\0"),
        meta_entry(0x07, b"skipped"),
        meta_entry(0x19, &digest),
    ]
    .concat();
    let data = avast_container(&[
        text_field(b"TYPE", "HeurSuspicious"),
        text_field(b"VIRU", "JS:Heur"),
        meta_field(&meta),
    ]);
    let record = avast::decode(&data).unwrap();
    assert_eq!(record.kind, RecordKind::Heuristic);

    let dir = tempfile::tempdir().unwrap();
    let written = report::write_outputs(&record, dir.path(), Some("job7")).unwrap();
    assert_eq!(written, vec![dir.path().join("job7_loader.js.heur")]);
    let text = std::fs::read_to_string(&written[0]).unwrap();
    assert_eq!(
        text,
        format!(
            "signature: JS:Heur\npath: C:\\scripts\\loader.js\nhash: SHA256HASH:{}\n",
            "42".repeat(32)
        )
    );
}

#[test]
fn test_malformed_meta_is_error() {
    let data = avast_container(&[text_field(b"META", "no separators here")]);
    let err = avast::decode(&data).unwrap_err();
    assert!(matches!(err, QuarantineError::MalformedField { .. }));
}
