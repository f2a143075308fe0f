//! Aggregating a tree into a ranked recommendation

use rstest::rstest;

use studycon::domain::{
    evaluate_tree, DegreeCourse, EstimationEntry, EvaluationResult, Level, NodeRecord,
    TaxonomyItem, TaxonomyTree, TreeRecord,
};
use studycon::util::testing::{self, leaf, sample_tree};

use DegreeCourse::*;

#[ctor::ctor]
fn init() {
    testing::init_test_setup();
}

fn tree_of(root_scores: &[(DegreeCourse, f64)], children: Vec<NodeRecord>) -> TaxonomyTree {
    let root = leaf("000000", "root", Level::Root, root_scores).with_children(children);
    TaxonomyTree::from_record(TreeRecord { root })
}

fn courses(entries: &[EstimationEntry]) -> Vec<DegreeCourse> {
    entries.iter().map(|e| e.degree_course).collect()
}

#[test]
fn given_scores_on_every_rank_when_evaluating_then_sums_them() {
    let tree = tree_of(
        &[],
        vec![leaf("a1xxxx", "A", Level::L1, &[(AC, 2.0)]).with_children([leaf(
            "a2xxxx",
            "B",
            Level::L2,
            &[],
        )
        .with_children([leaf("a3xxxx", "C", Level::L3, &[(AC, 3.0)])])])],
    );

    let result = evaluate_tree(&tree);

    assert_eq!(result.value(AC), 5.0);
    assert_eq!(result.get_estimation_by_course(AC).unwrap().value, 5.0);
    assert_eq!(result.result_set().len(), 9);
}

#[test]
fn given_sample_tree_when_evaluating_then_top_three_descend() {
    let result = evaluate_tree(&sample_tree());

    assert_eq!(result.value(SE), 6.0);
    assert_eq!(result.value(MTD), 5.0);
    assert_eq!(result.value(KWM), 2.0);
    assert_eq!(result.value(SI), 1.0);
    assert_eq!(result.value(MC), 1.0);

    let top = result.get_ordered_result();
    assert_eq!(courses(&top), vec![SE, MTD, KWM]);
    assert_eq!(top[0].value, 6.0);
}

#[test]
fn given_root_scores_when_evaluating_then_root_is_not_counted() {
    let tree = tree_of(&[(AC, 100.0)], vec![leaf("a1xxxx", "A", Level::L1, &[(AC, 1.0)])]);
    assert_eq!(evaluate_tree(&tree).value(AC), 1.0);
}

#[test]
fn given_undefined_course_when_evaluating_then_it_is_ignored() {
    let tree = tree_of(
        &[],
        vec![leaf("a1xxxx", "A", Level::L1, &[(Undefined, 9.0), (DA, 1.0)])],
    );

    let result = evaluate_tree(&tree);

    assert!(result.get_estimation_by_course(Undefined).is_none());
    assert_eq!(result.value(DA), 1.0);
    assert_eq!(courses(&result.get_ordered_result())[0], DA);
}

#[test]
fn given_empty_tree_when_evaluating_then_all_zero_in_declaration_order() {
    let tree = tree_of(&[], Vec::new());
    let result = evaluate_tree(&tree);

    assert!(result.result_set().iter().all(|e| e.value == 0.0));
    assert_eq!(courses(&result.get_ordered_result()), vec![AC, MC, HSD]);
}

#[test]
fn given_default_tree_when_evaluating_then_all_zero() {
    let result = evaluate_tree(&TaxonomyTree::new());
    assert!(result.result_set().iter().all(|e| e.value == 0.0));
}

#[test]
fn given_nine_distinct_totals_when_ranking_then_best_three_descend_from_the_result() {
    let tree = tree_of(
        &[],
        vec![
            leaf("a1xxxx", "A", Level::L1, &[(AC, 4.0), (MC, 5.0), (HSD, 1.0)]).with_children([
                leaf("a2xxxx", "B", Level::L2, &[(MC, 4.0), (MTD, 7.0), (KWM, 2.0)]),
            ]),
            leaf("b1xxxx", "C", Level::L1, &[(DA, 8.0), (SE, 3.0)]).with_children([leaf(
                "b2xxxx",
                "D",
                Level::L2,
                &[],
            )
            .with_children([leaf("b3xxxx", "E", Level::L3, &[(SI, 6.0), (MBI, 5.0)])])]),
        ],
    );
    let result = evaluate_tree(&tree);

    let top = result.get_ordered_result();

    assert_eq!(top.len(), 3);
    assert_eq!(courses(&top), vec![MC, DA, MTD]);
    assert!(top.windows(2).all(|w| w[0].value > w[1].value));
    for entry in &top {
        assert_eq!(result.get_estimation_by_course(entry.degree_course), Some(entry));
    }
}

#[test]
fn given_equal_values_when_ranking_then_declaration_order_breaks_ties() {
    let mut result = EvaluationResult::new();
    result.add_points_to_course(&EstimationEntry::new(MBI, 2.0));
    result.add_points_to_course(&EstimationEntry::new(SE, 2.0));
    result.add_points_to_course(&EstimationEntry::new(HSD, 2.0));
    result.add_points_to_course(&EstimationEntry::new(AC, 1.0));

    assert_eq!(courses(&result.get_ordered_result()), vec![HSD, SE, MBI]);
}

#[test]
fn given_negative_values_when_ranking_then_they_rank_below_zero() {
    let mut result = EvaluationResult::new();
    result.add_points_to_course(&EstimationEntry::new(AC, -1.0));
    let all = result.ordered_top(9);
    assert_eq!(all.last().unwrap().degree_course, AC);
}

#[rstest]
#[case(0, 0)]
#[case(1, 1)]
#[case(5, 5)]
#[case(20, 9)]
fn given_n_when_ordered_top_then_returns_at_most_n(#[case] n: usize, #[case] expected: usize) {
    let result = evaluate_tree(&sample_tree());
    assert_eq!(result.ordered_top(n).len(), expected);
}

#[test]
fn given_repeated_points_when_adding_then_accumulates() {
    let mut result = EvaluationResult::new();
    for _ in 0..4 {
        result.add_points_to_course(&EstimationEntry::new(SI, 0.25));
    }
    assert_eq!(result.value(SI), 1.0);
}

#[test]
fn given_items_with_seeded_scores_when_evaluating_then_matches_hand_sum() {
    let tree = tree_of(
        &[],
        vec![
            NodeRecord::new(TaxonomyItem::with_estimation(
                "A",
                Level::L1,
                EstimationEntry::new(KWM, 1.5),
                "",
            ))
            .with_children([NodeRecord::new(TaxonomyItem::with_estimation(
                "B",
                Level::L2,
                EstimationEntry::new(KWM, 2.5),
                "",
            ))]),
        ],
    );
    let result = evaluate_tree(&tree);
    assert_eq!(result.value(KWM), 4.0);
    assert_eq!(courses(&result.get_ordered_result())[0], KWM);
}

#[test]
fn given_result_when_serialized_then_is_a_plain_entry_list() {
    let result = evaluate_tree(&sample_tree());
    let value = serde_json::to_value(&result).unwrap();
    assert!(value.is_array());
    assert_eq!(value.as_array().unwrap().len(), 9);
}
