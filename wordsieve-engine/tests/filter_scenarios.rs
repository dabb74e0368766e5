//! Query-surface scenarios over both matching backends.

use std::time::Duration;

use wordsieve_engine::{FilterKind, FilterOptions, Manager, Normalizer, StoreOptions};

fn manager(kind: FilterKind) -> Manager {
    Manager::new(StoreOptions::default(), FilterOptions { kind }).unwrap()
}

/// Give the batched rebuild window time to land.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(250)).await;
}

#[tokio::test]
async fn test_cjk_detection_and_rewriting() {
    for kind in [FilterKind::Trie, FilterKind::Ac] {
        let m = manager(kind);
        m.add_words(&["台湾国", "毒品"]).await.unwrap();
        settle().await;

        let text = "这是一个测试文本包含多个敏感词台湾国毒品销售违禁内容";

        assert!(m.is_sensitive(text));
        assert_eq!(m.find_all(text), vec!["台湾国", "毒品"]);
        assert_eq!(
            m.replace(text, '*'),
            "这是一个测试文本包含多个敏感词*****销售违禁内容"
        );
        assert_eq!(
            m.remove(text),
            "这是一个测试文本包含多个敏感词销售违禁内容"
        );

        let counts = m.find_all_count(text);
        assert_eq!(counts.len(), 2);
        assert_eq!(counts["台湾国"], 1);
        assert_eq!(counts["毒品"], 1);
    }
}

#[tokio::test]
async fn test_fullwidth_hit_returns_original_substring() {
    let m = manager(FilterKind::Ac);
    m.add_word("test").await.unwrap();
    settle().await;

    assert!(m.is_sensitive("ＴｅＳｔ"));
    assert_eq!(m.find_one("ＴｅＳｔ").unwrap(), "ＴｅＳｔ");
}

#[tokio::test]
async fn test_mixed_width_prefix_hit() {
    let m = manager(FilterKind::Trie);
    m.add_word("http").await.unwrap();
    settle().await;

    assert!(m.is_sensitive("Ｈttp"));
    assert_eq!(m.find_one("Ｈttp").unwrap(), "Ｈttp");
}

#[tokio::test]
async fn test_overlapping_patterns_ushers() {
    let m = manager(FilterKind::Ac);
    m.add_words(&["he", "she", "his", "hers"]).await.unwrap();
    settle().await;

    assert_eq!(m.find_all("ushers"), vec!["she", "he", "hers"]);
}

#[tokio::test]
async fn test_obfuscated_text_matches_like_plain_text() {
    let m = manager(FilterKind::Ac);
    m.add_word("badword").await.unwrap();
    settle().await;

    let plain = "this has badword inside";
    let styled = "this has ＢａｄＷｏｒｄ inside";

    let plain_hits = m.find_all(plain);
    let styled_hits = m.find_all(styled);
    assert_eq!(plain_hits.len(), styled_hits.len());
    assert_eq!(
        plain_hits[0].chars().count(),
        styled_hits[0].chars().count()
    );
    assert_eq!(styled_hits[0], "ＢａｄＷｏｒｄ");
}

#[tokio::test]
async fn test_strict_normalizer_defeats_layered_obfuscation() {
    let m = Manager::with_normalizer(
        StoreOptions::default(),
        FilterOptions {
            kind: FilterKind::Ac,
        },
        Normalizer::strict(),
    )
    .unwrap();
    m.add_word("台湾国").await.unwrap();
    settle().await;

    // zero-width insertion plus Traditional forms
    let text = "嗨台\u{200B}灣國嗨";
    assert!(m.is_sensitive(text));

    let hit = m.find_one(text).unwrap();
    assert_eq!(hit, "台\u{200B}灣國");
    // re-normalizing the original substring recovers the pattern
    assert_eq!(Normalizer::strict().normalize_word(&hit), "台湾国");

    // dropped code points inside the span are rewritten too
    assert_eq!(m.replace(text, '*'), "嗨****嗨");
}

#[tokio::test]
async fn test_count_collapses_distinct_originals_of_one_pattern() {
    let m = manager(FilterKind::Trie);
    m.add_word("test").await.unwrap();
    settle().await;

    let counts = m.find_all_count("Test and ＴＥＳＴ");
    assert_eq!(counts.len(), 1);
    // keyed by the first original substring
    assert_eq!(counts["Test"], 2);
}

#[tokio::test]
async fn test_word_sources_union_in_insertion_order() {
    let m = manager(FilterKind::Ac);
    m.add_words_with_source(&["违禁词A", "违禁词B"], "custom")
        .await
        .unwrap();
    m.add_words_with_source(&["违禁词A", "违禁词C"], "business")
        .await
        .unwrap();

    assert_eq!(m.word_sources("违禁词A"), vec!["custom", "business"]);
    assert_eq!(m.word_sources("违禁词B"), vec!["custom"]);
    assert!(m.word_sources("违禁词Z").is_empty());
}

#[tokio::test]
async fn test_find_all_with_source_attaches_provenance() {
    let m = manager(FilterKind::Ac);
    m.add_words_with_source(&["赌博"], "people_life").await.unwrap();
    m.add_words_with_source(&["赌博", "色情"], "custom").await.unwrap();
    settle().await;

    let results = m.find_all_with_source("网上赌博和色情内容");
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].word, "赌博");
    assert_eq!(results[0].sources, vec!["people_life", "custom"]);
    assert_eq!(results[1].word, "色情");
    assert_eq!(results[1].sources, vec!["custom"]);

    let counted = m.find_all_count_with_source("赌博赌博");
    assert_eq!(counted["赌博"].count, 2);
    assert_eq!(counted["赌博"].sources, vec!["people_life", "custom"]);
}

#[tokio::test]
async fn test_backends_agree_on_hit_sets() {
    use std::collections::BTreeSet;

    let texts = [
        "ushers and fishers",
        "这是毒品台湾国混合ＴｅＳｔ文本",
        "no hits at all",
    ];

    let trie = manager(FilterKind::Trie);
    let ac = manager(FilterKind::Ac);
    for m in [&trie, &ac] {
        m.add_words(&["he", "she", "hers", "fish", "毒品", "台湾国", "test"])
            .await
            .unwrap();
    }
    settle().await;

    for text in texts {
        let a: BTreeSet<String> = trie.find_all(text).into_iter().collect();
        let b: BTreeSet<String> = ac.find_all(text).into_iter().collect();
        assert_eq!(a, b, "backends disagree on {text:?}");
    }
}

#[tokio::test]
async fn test_embedded_categories_load_and_match() {
    let m = manager(FilterKind::Ac);
    for (name, content) in wordsieve_engine::dicts::ALL {
        m.load_with_source(content, name).await.unwrap();
    }
    settle().await;

    assert!(m.stats().total_words > 0);
    assert!(m.is_sensitive("参与网络赌博被骗"));
    assert_eq!(m.word_sources("网络赌博"), vec!["people_life"]);
}
