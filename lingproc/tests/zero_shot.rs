use lingproc::rank_candidates;

#[test]
fn ranks_by_descending_entailment() {
    let candidates = ["PLAYER_SMALLTALK", "PLAYER_ASK_WHERE_AM_I", "PLAYER_ASK_FOR_HELP"];
    let ranked = rank_candidates(&candidates, &[0.5, 3.0, -1.0]);
    let labels: Vec<&str> = ranked.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(
        labels,
        vec!["PLAYER_ASK_WHERE_AM_I", "PLAYER_SMALLTALK", "PLAYER_ASK_FOR_HELP"]
    );
    let total: f32 = ranked.iter().map(|r| r.score).sum();
    assert!((total - 1.0).abs() < 1e-5);
}

#[test]
fn equal_scores_keep_candidate_order() {
    let candidates = ["a", "b", "c"];
    let ranked = rank_candidates(&candidates, &[1.0, 1.0, 1.0]);
    assert_eq!(ranked[0].label, "a");
    assert_eq!(ranked[2].label, "c");
}
