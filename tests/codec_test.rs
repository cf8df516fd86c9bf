//! End-to-end codec tests.
//!
//! Decoding of realistic documents, the XML transport, the encode/decode
//! round trip, and streaming through files.

use std::io::Write;

use proptest::prelude::*;
use tempfile::NamedTempFile;
use wheelwriter::markup::tags;
use wheelwriter::wheelwriter::codes;
use wheelwriter::{
    Decoder, DecoderConfig, FileHeader, Format, MarkupEvent, decode, decode_to_xml, decode_with,
    encode, encode_xml,
};

/// A short letter: header, margin, a title, bold and accented text.
fn sample_document() -> Vec<u8> {
    let mut bytes = FileHeader {
        id: " 1=".to_string(),
        ..FileHeader::default()
    }
    .to_bytes();
    bytes.extend_from_slice(&codes::MARGIN_BRACKET);
    // title bracket " CARTA"
    bytes.extend_from_slice(&[
        0x2b, 0xa7, 0x0c, 0x40, 0xc3, 0xc1, 0xd9, 0xe3, 0xc1, 0x0c, 0xa7, 0x2b,
    ]);
    // "Se" bold, then "ñor"
    bytes.extend_from_slice(&[0x21, 0xe2, 0x21, 0x85, 0x49, 0x96, 0x99]);
    // ":" and a paragraph end
    bytes.extend_from_slice(&[0x7a, 0x06]);
    bytes.extend_from_slice(&codes::MARGIN_BRACKET);
    // "caf" + é + "s"
    bytes.extend_from_slice(&[0x83, 0x81, 0x86]);
    bytes.extend_from_slice(&[0x2b, 0xa6, 0x09, 0x00, 0x85, 0xbe, 0x09, 0xa6, 0x2b]);
    bytes.extend_from_slice(&[0xa2, 0x15]);
    let size = (bytes.len() - codes::HEADER_LEN) as u16;
    bytes[5..7].copy_from_slice(&size.to_le_bytes());
    bytes
}

fn text_of(events: &[MarkupEvent]) -> String {
    events.iter().filter_map(MarkupEvent::text).collect()
}

fn paragraph_count(events: &[MarkupEvent]) -> usize {
    events.iter().filter(|e| e.is_start_of(tags::PARAGRAPH)).count()
}

// ============================================================================
// Decoding
// ============================================================================

#[test]
fn test_decode_sample_document() {
    let bytes = sample_document();
    let (events, info) = decode_with(&bytes, DecoderConfig::default());

    let header = info.header.expect("header decoded");
    assert_eq!(header.id, " 1=");
    assert_eq!(header.number(), Some(1));
    assert_eq!(header.file_length(), bytes.len());
    assert_eq!(info.title.as_deref(), Some(" CARTA"));

    assert_eq!(text_of(&events), "Señor:cafés");
    assert_eq!(paragraph_count(&events), 1);
    assert!(events.iter().any(|e| e.is_start_of(tags::BOLD)));
    assert!(events.iter().any(|e| e.is_start_of(tags::LINE)));
}

#[test]
fn test_paragraph_byte_yields_single_break() {
    let events = decode(&[0x06]);
    assert_eq!(
        events,
        vec![
            MarkupEvent::start(tags::PARAGRAPH),
            MarkupEvent::end(tags::PARAGRAPH),
            MarkupEvent::LineBreak,
        ]
    );
}

#[test]
fn test_accent_pairs_compose() {
    let cases: &[(u8, u8, &str)] = &[
        (0x81, 0x5f, "â"),
        (0xc5, 0x79, "È"),
        (0x83, 0x9d, "ç"),
        (0xe4, 0xbd, "Ü"),
        (0x89, 0xbe, "í"),
        (0x96, 0x61, "ø"),
    ];
    for &(base, diacritic, expected) in cases {
        let events = decode(&[0x2b, 0xa6, 0x09, 0x00, base, diacritic, 0x09, 0xa6, 0x2b]);
        assert_eq!(events, vec![MarkupEvent::characters(expected)], "{base:02x},{diacritic:02x}");
    }
}

#[test]
fn test_unmapped_accent_placeholder() {
    let events = decode(&[0x2b, 0xa6, 0x09, 0x00, 0x99, 0x5f, 0x09, 0xa6, 0x2b]);
    assert_eq!(events, vec![MarkupEvent::characters("{code 99,5f}")]);
}

#[test]
fn test_micro_step_is_silent() {
    let events = decode(&[0xc1, 0x2b, 0xa6, 0x09, 0x00, 0x28, 0x08, 0x09, 0xa6, 0x2b, 0xc2]);
    assert_eq!(
        events,
        vec![MarkupEvent::characters("A"), MarkupEvent::characters("B")]
    );
}

#[test]
fn test_decoration_then_plain_byte() {
    assert_eq!(
        decode(&[0x21, 0xc1]),
        vec![
            MarkupEvent::start(tags::BOLD),
            MarkupEvent::end(tags::BOLD),
            MarkupEvent::characters("A"),
        ]
    );
}

#[test]
fn test_misplaced_header_is_dumped() {
    let mut bytes = vec![0xc1];
    bytes.extend_from_slice(&codes::MARGIN_BRACKET);
    bytes.extend_from_slice(&FileHeader::default().to_bytes());
    let (events, info) = decode_with(&bytes, DecoderConfig::default());
    assert!(info.header.is_none());
    let comments: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, MarkupEvent::Comment { .. }))
        .collect();
    assert_eq!(comments.len(), 1);
}

// ============================================================================
// XML transport
// ============================================================================

#[test]
fn test_decode_to_xml() {
    let xml = decode_to_xml(&sample_document()).unwrap();
    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<html>\n<body>\n"));
    assert!(xml.contains("<!-- file header: id=\" 1=\""), "{xml}");
    assert!(xml.contains("<!-- title[12]:  CARTA\n-->"), "{xml}");
    assert!(xml.contains("<br type=\"soft\"/>"), "{xml}");
    assert!(xml.contains("<p/>\n"), "{xml}");
    assert!(xml.contains("cafés"), "{xml}");
    assert!(xml.ends_with("</body>\n</html>\n"));
}

#[test]
fn test_xml_round_trip_keeps_text() {
    let original = sample_document();
    let xml = decode_to_xml(&original).unwrap();
    let bytes = encode_xml(&xml).unwrap();

    let events = decode(&bytes);
    assert_eq!(text_of(&events), "Señor:cafés");
    // the paragraph end and the hard line both come back as paragraphs
    assert_eq!(paragraph_count(&events), 2);
}

#[test]
fn test_xml_round_trip_keeps_paragraphs() {
    let xml = decode_to_xml(&[0xc1, 0x06, 0xc2]).unwrap();
    let events = decode(&encode_xml(&xml).unwrap());
    assert_eq!(text_of(&events), "AB");
    assert_eq!(paragraph_count(&events), 1);
}

#[test]
fn test_encode_xml_rejects_malformed() {
    assert!(encode_xml("<html><body><p></body></html>").is_err());
}

// ============================================================================
// Encoding
// ============================================================================

#[test]
fn test_encode_decode_lossless_subset() {
    let events = vec![
        MarkupEvent::characters("Dear Sir,"),
        MarkupEvent::start(tags::PARAGRAPH),
        MarkupEvent::end(tags::PARAGRAPH),
        MarkupEvent::characters("Regards"),
    ];
    let decoded = decode(&encode(&events));
    assert_eq!(text_of(&decoded), "Dear Sir,Regards");
    assert_eq!(paragraph_count(&decoded), 1);

    let texts: Vec<&str> = decoded.iter().filter_map(MarkupEvent::text).collect();
    assert_eq!(texts, vec!["Dear Sir,", "Regards"]);
}

#[test]
fn test_encode_decode_with_marker_in_size_field() {
    // body lengths whose low or high size byte is 0x2b
    let margin = codes::MARGIN_BRACKET.len();
    for body in [0x2b, 0x2b10] {
        let text = "a".repeat(body - margin);
        let bytes = encode(&[MarkupEvent::characters(text.as_str())]);
        assert_eq!(bytes.len() - codes::HEADER_LEN, body);

        let (events, info) = decode_with(&bytes, DecoderConfig::default());
        assert_eq!(info.header.unwrap().file_length(), bytes.len());
        assert_eq!(text_of(&events), text);
    }
}

#[test]
fn test_encoded_header_declares_length() {
    let bytes = encode(&[MarkupEvent::characters("abc")]);
    let (_, info) = decode_with(&bytes, DecoderConfig::default());
    let header = info.header.unwrap();
    assert_eq!(header.file_length(), bytes.len());
    assert_eq!(header.words, vec![72, 96, 1008, 96, 1008, 108, 144, 240, 588, 720]);
}

// ============================================================================
// Streaming
// ============================================================================

#[test]
fn test_decode_reader_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&sample_document()).unwrap();
    file.flush().unwrap();

    let input = std::fs::File::open(file.path()).unwrap();
    let mut events = Vec::new();
    let info = Format::Wheelwriter
        .decode_reader(input, &mut events, DecoderConfig::default())
        .unwrap();

    assert_eq!(info.title.as_deref(), Some(" CARTA"));
    assert_eq!(events, decode(&sample_document()));
}

// ============================================================================
// Properties
// ============================================================================

fn decode_chunked(bytes: &[u8], chunk: usize, config: DecoderConfig) -> Vec<MarkupEvent> {
    let mut events = Vec::new();
    let mut decoder = Decoder::with_config(config);
    for part in bytes.chunks(chunk) {
        decoder.feed(part, &mut events).unwrap();
    }
    decoder.finish(&mut events).unwrap();
    events
}

/// Characters the decoder emits as text and the encoder writes back
/// unchanged.
fn lossless_char() -> impl Strategy<Value = char> {
    prop_oneof![
        prop::char::range('a', 'z'),
        prop::char::range('A', 'Z'),
        prop::char::range('0', '9'),
        Just(' '),
        Just('.'),
        Just(','),
        Just('é'),
        Just('ñ'),
    ]
}

proptest! {
    #[test]
    fn prop_decode_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        let _ = decode(&bytes);
    }

    #[test]
    fn prop_chunking_does_not_change_output(
        bytes in prop::collection::vec(any::<u8>(), 0..512),
        chunk in 1usize..64,
        nested in any::<bool>(),
    ) {
        let config = DecoderConfig::new().with_nested_decorations(nested);
        let whole = decode_chunked(&bytes, bytes.len().max(1), config.clone());
        let parts = decode_chunked(&bytes, chunk, config);
        prop_assert_eq!(parts, whole);
    }

    #[test]
    fn prop_plain_text_survives_encode(
        lines in prop::collection::vec(prop::collection::vec(lossless_char(), 1..40), 1..6)
    ) {
        let mut events = Vec::new();
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                events.push(MarkupEvent::start(tags::PARAGRAPH));
                events.push(MarkupEvent::end(tags::PARAGRAPH));
            }
            events.push(MarkupEvent::characters(line.iter().collect::<String>()));
        }

        let decoded = decode(&encode(&events));
        let texts: Vec<String> = decoded
            .iter()
            .filter_map(MarkupEvent::text)
            .map(str::to_string)
            .collect();
        let expected: Vec<String> = lines.iter().map(|l| l.iter().collect()).collect();
        prop_assert_eq!(texts, expected);
        prop_assert_eq!(paragraph_count(&decoded), lines.len() - 1);
    }

    #[test]
    fn prop_decoded_text_survives_round_trip(
        bytes in prop::collection::vec(0x40u8..=0xfe, 0..256)
    ) {
        let first = text_of(&decode(&bytes));
        let again = text_of(&decode(&encode(&decode(&bytes))));
        prop_assert_eq!(again, first);
    }
}
