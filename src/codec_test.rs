#![allow(clippy::float_cmp)]

use serde_json::json;

use super::*;
use crate::doc::{DecorationData, DecorationId, DrawingData, StickerData, TextData};

fn sample() -> FaceDecorations {
    let mut sticker = Decoration::new(10.0, 20.0, DecorationData::Sticker(StickerData::default()));
    sticker.scale = Some(0.5);
    sticker.rotation = Some(0.0);
    let text = Decoration::new(0.0, 0.0, DecorationData::Text(TextData { text: "Hi".into(), ..TextData::default() }));
    let drawing = Decoration::new(
        0.0,
        0.0,
        DecorationData::Drawing(DrawingData {
            paths: vec![vec![[0.0, 0.0], [1.5, 2.5], [3.0, 4.0]], vec![[9.0, 9.0]]],
            ..DrawingData::default()
        }),
    );
    FaceDecorations { front: vec![sticker, text], back: vec![drawing] }
}

// =============================================================
// Generic transform
// =============================================================

#[test]
fn encode_value_removes_every_array() {
    let encoded = encode_value(json!({ "a": [[1, 2], [3]] }));
    assert_eq!(encoded, json!({ "a": { "0": { "0": 1, "1": 2 }, "1": { "0": 3 } } }));
}

#[test]
fn decode_value_orders_by_index_not_key_text() {
    let decoded = decode_value(json!({ "10": "k", "2": "c", "0": "a" }));
    assert_eq!(decoded, json!(["a", "c", "k"]));
}

#[test]
fn non_index_objects_stay_objects() {
    let value = json!({ "0": 1, "x": 2 });
    assert_eq!(decode_value(value.clone()), value);
    assert_eq!(decode_value(json!({})), json!({}));
}

// =============================================================
// Typed round trip
// =============================================================

#[test]
fn round_trip_preserves_card() {
    let card = sample();
    let encoded = encode(&card).unwrap();
    assert_eq!(decode(encoded), card);
}

#[test]
fn encoded_card_has_no_arrays() {
    fn has_array(v: &Value) -> bool {
        match v {
            Value::Array(_) => true,
            Value::Object(map) => map.values().any(has_array),
            _ => false,
        }
    }
    let encoded = encode(&sample()).unwrap();
    assert!(!has_array(&encoded));
}

#[test]
fn empty_paths_survive_round_trip() {
    let empty = Decoration::new(0.0, 0.0, DecorationData::Drawing(DrawingData::default()));
    let mut with_empty_stroke = Decoration::new(0.0, 0.0, DecorationData::Drawing(DrawingData::default()));
    with_empty_stroke.data =
        DecorationData::Drawing(DrawingData { paths: vec![vec![], vec![[1.0, 1.0]]], ..DrawingData::default() });
    let card = FaceDecorations { front: vec![empty, with_empty_stroke], back: vec![] };
    assert_eq!(decode(encode(&card).unwrap()), card);
}

#[test]
fn string_round_trip() {
    let card = sample();
    let raw = to_json_string(&card).unwrap();
    assert_eq!(from_json_str(&raw).unwrap(), card);
    assert!(from_json_str("not json").is_err());
}

#[test]
fn string_round_trip_keeps_full_precision_coordinates() {
    // Pointer mappings such as `(screen - left) / width * 480` yield 17-digit values.
    let mapped = 317.0 / 733.0 * 480.0 - 240.0;
    let values = [-149.304_054_802_682_15, mapped, 0.1 + 0.2, 239.999_999_999_999_97];
    let stroke: Vec<[f64; 2]> = values.iter().map(|&v| [v, -v]).collect();
    let mut sticker = Decoration::new(values[0], values[1], DecorationData::Sticker(StickerData::default()));
    sticker.scale = Some(values[2]);
    let drawing = Decoration::new(
        0.0,
        0.0,
        DecorationData::Drawing(DrawingData { paths: vec![stroke], ..DrawingData::default() }),
    );
    let card = FaceDecorations { front: vec![sticker], back: vec![drawing] };

    let back = from_json_str(&to_json_string(&card).unwrap()).unwrap();
    assert_eq!(back, card);
    assert_eq!(back.front[0].x.to_bits(), (-149.304_054_802_682_15_f64).to_bits());
}

#[test]
fn non_finite_coordinate_drops_only_that_decoration() {
    let mut card = sample();
    card.front[0].x = f64::NAN;
    let encoded = encode(&card).unwrap();
    assert_eq!(decode(encoded).front.len(), 1);
}

// =============================================================
// Lenient decoding
// =============================================================

#[test]
fn missing_or_null_faces_are_empty() {
    let card = decode(json!({ "front": null }));
    assert!(card.is_empty());
    assert!(decode(Value::Null).is_empty());
    assert!(decode(json!("garbage")).is_empty());
}

#[test]
fn non_sequence_face_is_empty() {
    let card = decode(json!({ "front": 42, "back": "x" }));
    assert!(card.is_empty());
}

#[test]
fn keyed_face_uses_its_values() {
    let card = decode(json!({
        "front": {
            "-Nabc": { "type": "sticker", "id": "s1", "x": 1, "y": 2, "data": { "url": "u", "color": "#fff", "scale": 1 } }
        }
    }));
    assert_eq!(card.front.len(), 1);
    assert_eq!(card.front[0].id, DecorationId::new("s1"));
}

#[test]
fn malformed_entries_are_dropped() {
    let card = decode(json!({
        "front": {
            "0": { "type": "sticker", "id": "ok", "data": {} },
            "1": { "type": "unknown", "id": "bad" },
            "2": "not an object"
        }
    }));
    assert_eq!(card.front.len(), 1);
    assert_eq!(card.front[0].id, DecorationId::new("ok"));
}
