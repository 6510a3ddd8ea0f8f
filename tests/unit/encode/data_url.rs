use super::*;

const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0";

#[test]
fn sniffs_common_formats() {
    assert_eq!(sniff_mime(PNG_MAGIC), "image/png");
    assert_eq!(sniff_mime(&[0xFF, 0xD8, 0xFF, 0xE0]), "image/jpeg");
    assert_eq!(sniff_mime(b"GIF89a..."), "image/gif");
    assert_eq!(sniff_mime(b"RIFF\0\0\0\0WEBPVP8 "), "image/webp");
    assert_eq!(sniff_mime(b"hello"), "application/octet-stream");
    assert_eq!(sniff_mime(&[]), "application/octet-stream");
}

#[test]
fn png_data_url_shape() {
    let url = to_data_url("image/png", b"abc");
    assert_eq!(url, "data:image/png;base64,YWJj");
    assert_eq!(from_data_url(&url).unwrap(), b"abc");
}

#[test]
fn storefront_prefixes_and_bare_payloads_decode() {
    for prefix in ["data:image/png;base64,", "data:image/jpeg;base64,", "data:image/jpg;base64,"] {
        assert_eq!(from_data_url(&format!("{prefix}YWJj")).unwrap(), b"abc");
    }
    assert_eq!(from_data_url("YWJj").unwrap(), b"abc");
    assert_eq!(from_data_url("  YW\nJj ").unwrap(), b"abc");
}

#[test]
fn malformed_data_urls_are_serde_errors() {
    assert!(matches!(
        from_data_url("data:image/png;base64"),
        Err(StudioError::Serde(_))
    ));
    assert!(matches!(
        from_data_url("data:text/plain,hello"),
        Err(StudioError::Serde(_))
    ));
    assert!(matches!(from_data_url("@@@"), Err(StudioError::Serde(_))));
}
