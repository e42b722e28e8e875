// core/tests/decode_stream.rs
//
// End-to-end decoding of keystroke streams against a table directory.

use libcodetable_core::{parse_tokens, Decoded, Decoder, Key, TableStore};
use std::fs;
use tempfile::TempDir;

fn store_with(body: &str) -> (TempDir, TableStore) {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("main.txt"), body).unwrap();
    let store = TableStore::open(dir.path());
    (dir, store)
}

fn decode_all(store: &TableStore, tokens: &str) -> Vec<Decoded> {
    store
        .decode(parse_tokens(tokens))
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

fn texts(items: &[Decoded]) -> String {
    items.iter().filter_map(|d| d.text()).collect()
}

#[test]
fn test_sentence_with_selection_and_punctuation() {
    let (_dir, store) = store_with(
        "我\tq\n们\twu\n人\tw\n是\tj\n中国\tkhlg\n中\tk\n口\tk\n",
    );
    let out = decode_all(&store, "q space w u space j space k h l g k ; , enter");
    assert_eq!(texts(&out), "我们是中国口,");
    assert_eq!(out.last(), Some(&Decoded::Sign("enter".into())));
}

#[test]
fn test_unique_four_letter_code() {
    let (_dir, store) = store_with("甲\tabcd\n");
    let mut stream = store.decode(parse_tokens("a b c d"));
    let first = stream.next().unwrap().unwrap();
    assert_eq!(first.entry().map(|e| e.word.as_str()), Some("甲"));
    assert!(stream.next().is_none());
    assert_eq!(stream.pending(), "");
}

#[test]
fn test_overflow_emits_top_and_reseeds() {
    let (_dir, store) = store_with("甲\tabcd\n乙\tabcd\t3\n饿\te\n");
    let mut stream = store.decode(parse_tokens("a b c d e"));
    let first = stream.next().unwrap().unwrap();
    assert_eq!(first.entry().map(|e| e.word.as_str()), Some("乙"));
    assert!(stream.next().is_none());
    assert_eq!(stream.pending(), "e");
}

#[test]
fn test_cancel_discards_pending_code() {
    let (_dir, store) = store_with("甲\tab\n");
    let out = decode_all(&store, "a b esc space");
    // space after the cancel sees an empty buffer
    assert_eq!(out, vec![Decoded::Sign("space".into())]);
}

#[test]
fn test_selection_out_of_range() {
    let (_dir, store) = store_with("甲\tabcd\n乙\tabcd\n");
    let out = decode_all(&store, "a b c d 2");
    assert_eq!(out, vec![Decoded::Undefine("abcd2".into())]);
}

#[test]
fn test_digits_without_code_are_numbers() {
    let (_dir, store) = store_with("甲\tab\n");
    let out = decode_all(&store, "2 0 2 6");
    assert_eq!(texts(&out), "2026");
    assert!(out.iter().all(|d| matches!(d, Decoded::Number(_))));
}

#[test]
fn test_fresh_decoder_has_no_state() {
    let (_dir, store) = store_with("甲\tab\n");
    let table = store.table().unwrap();

    let mut decoder = Decoder::new();
    assert!(decoder.feed(&Key::Letter('a'), &table).is_empty());
    assert_eq!(decoder.pending(), "a");

    // a second stream does not inherit the first one's buffer
    let out = decode_all(&store, "b space");
    assert_eq!(out, vec![Decoded::Undefine("bspace".into())]);
}

#[test]
fn test_missing_directory_surfaces_in_stream() {
    let dir = tempfile::tempdir().unwrap();
    let store = TableStore::open(dir.path().join("absent"));
    let mut stream = store.decode(parse_tokens("a"));
    assert!(stream.next().unwrap().is_err());
    assert!(stream.next().is_none());
}
