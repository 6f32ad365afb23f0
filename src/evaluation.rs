use tracing::warn;

/// Binary confusion matrix at a fixed threshold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfusionMatrix {
    pub true_positives: usize,
    pub true_negatives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
}

/// Offline evaluation metrics for a scored, labelled dataset.
#[derive(Debug, Clone)]
pub struct EvaluationReport {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub roc_auc: f64,
    pub confusion: ConfusionMatrix,
    pub threshold: f64,
    pub n_samples: usize,
}

/// Evaluate churn probabilities against ground-truth labels.
///
/// Predictions are thresholded with `proba >= threshold`, matching the
/// training-side evaluation. Degenerate denominators yield 0 rather than
/// NaN.
pub fn evaluate_scores(probabilities: &[f64], labels: &[u8], threshold: f64) -> EvaluationReport {
    assert_eq!(
        probabilities.len(),
        labels.len(),
        "probability and label counts must match"
    );

    let mut confusion = ConfusionMatrix::default();
    for (&proba, &label) in probabilities.iter().zip(labels.iter()) {
        let predicted = u8::from(proba >= threshold);
        match (label, predicted) {
            (1, 1) => confusion.true_positives += 1,
            (0, 0) => confusion.true_negatives += 1,
            (0, 1) => confusion.false_positives += 1,
            (1, _) => confusion.false_negatives += 1,
            _ => {}
        }
    }

    let precision = ratio(
        confusion.true_positives,
        confusion.true_positives + confusion.false_positives,
    );
    let recall = ratio(
        confusion.true_positives,
        confusion.true_positives + confusion.false_negatives,
    );
    let f1_score = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };

    EvaluationReport {
        precision,
        recall,
        f1_score,
        roc_auc: roc_auc(probabilities, labels),
        confusion,
        threshold,
        n_samples: labels.len(),
    }
}

/// Rank-based (Mann-Whitney) ROC AUC with averaged ranks for ties.
pub fn roc_auc(probabilities: &[f64], labels: &[u8]) -> f64 {
    let n_positive = labels.iter().filter(|&&l| l == 1).count();
    let n_negative = labels.len() - n_positive;

    if n_positive == 0 || n_negative == 0 {
        warn!("ROC AUC is undefined with a single class, reporting 0.5");
        return 0.5;
    }

    let mut order: Vec<usize> = (0..probabilities.len()).collect();
    order.sort_by(|&a, &b| {
        probabilities[a]
            .partial_cmp(&probabilities[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    // Average ranks across tied scores.
    let mut ranks = vec![0.0; probabilities.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && probabilities[order[j + 1]] == probabilities[order[i]] {
            j += 1;
        }
        let average_rank = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = average_rank;
        }
        i = j + 1;
    }

    let positive_rank_sum: f64 = labels
        .iter()
        .zip(ranks.iter())
        .filter(|(&label, _)| label == 1)
        .map(|(_, &rank)| rank)
        .sum();

    let n_pos = n_positive as f64;
    let n_neg = n_negative as f64;
    (positive_rank_sum - n_pos * (n_pos + 1.0) / 2.0) / (n_pos * n_neg)
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}
