//! Classifiers over a fully numeric encoded row.
//!
//! Two concrete models are provided:
//! - [`TreeEnsemble`]: a binary gradient-boosted tree ensemble (log-loss)
//! - [`LogisticModel`]: binary logistic regression
//!
//! Both are plain immutable data, so prediction is a pure read and safe to share
//! across threads.

/// A pre-trained classifier.
///
/// `Send + Sync` is required because batch prediction shares one instance
/// across rayon workers. Rows passed in always have length `n_features()`.
pub trait Classifier: Send + Sync {
    /// Short name for logs and `income inspect`.
    fn kind(&self) -> &'static str;

    fn n_features(&self) -> usize;

    fn n_classes(&self) -> usize;

    /// Predicted class index.
    fn predict(&self, row: &[f64]) -> usize;

    /// Class probabilities, if the model is probabilistic.
    fn predict_proba(&self, _row: &[f64]) -> Option<Vec<f64>> {
        None
    }

    /// Number of trees, for tree ensembles.
    fn n_trees(&self) -> Option<usize> {
        None
    }
}

/// Split condition for a decision node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitCondition {
    pub feature_index: usize,
    /// Go left if `feature <= threshold`.
    pub threshold: f64,
}

impl SplitCondition {
    #[inline]
    pub fn go_left(&self, row: &[f64]) -> bool {
        row[self.feature_index] <= self.threshold
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Split {
        condition: SplitCondition,
        left: usize,
        right: usize,
    },
    Leaf(f64),
}

/// One regression tree stored as a flat node array, root at index 0.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Validate and wrap a node array.
    ///
    /// Children must point forward (`child > parent`) and stay in bounds, which
    /// guarantees every traversal terminates at a leaf.
    pub fn new(nodes: Vec<Node>, n_features: usize) -> Result<Self, String> {
        if nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (idx, node) in nodes.iter().enumerate() {
            if let Node::Split {
                condition,
                left,
                right,
            } = node
            {
                for child in [*left, *right] {
                    if child <= idx || child >= nodes.len() {
                        return Err(format!(
                            "node {idx} references child {child} but tree has {} nodes",
                            nodes.len()
                        ));
                    }
                }
                if condition.feature_index >= n_features {
                    return Err(format!(
                        "node {idx} splits on feature {} but the model has {n_features} features",
                        condition.feature_index
                    ));
                }
                if !condition.threshold.is_finite() {
                    return Err(format!("node {idx} has a non-finite threshold"));
                }
            }
        }
        Ok(Self { nodes })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn predict(&self, row: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf(value) => return *value,
                Node::Split {
                    condition,
                    left,
                    right,
                } => {
                    idx = if condition.go_left(row) { *left } else { *right };
                }
            }
        }
    }
}

/// Binary gradient-boosted tree ensemble.
///
/// `margin = init_score + learning_rate * Σ tree(row)`, `p(class 1) = sigmoid(margin)`.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeEnsemble {
    n_features: usize,
    init_score: f64,
    learning_rate: f64,
    trees: Vec<Tree>,
}

impl TreeEnsemble {
    pub fn new(n_features: usize, init_score: f64, learning_rate: f64, trees: Vec<Tree>) -> Result<Self, String> {
        if !init_score.is_finite() || !learning_rate.is_finite() {
            return Err("init_score and learning_rate must be finite".to_string());
        }
        Ok(Self {
            n_features,
            init_score,
            learning_rate,
            trees,
        })
    }

    pub fn margin(&self, row: &[f64]) -> f64 {
        let sum: f64 = self.trees.iter().map(|t| t.predict(row)).sum();
        self.init_score + self.learning_rate * sum
    }
}

impl Classifier for TreeEnsemble {
    fn kind(&self) -> &'static str {
        "gradient_boosting"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn n_classes(&self) -> usize {
        2
    }

    fn predict(&self, row: &[f64]) -> usize {
        usize::from(sigmoid(self.margin(row)) > 0.5)
    }

    fn predict_proba(&self, row: &[f64]) -> Option<Vec<f64>> {
        let p = sigmoid(self.margin(row));
        Some(vec![1.0 - p, p])
    }

    fn n_trees(&self) -> Option<usize> {
        Some(self.trees.len())
    }
}

/// Binary logistic regression.
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticModel {
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LogisticModel {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Result<Self, String> {
        if coefficients.is_empty() {
            return Err("logistic model has no coefficients".to_string());
        }
        if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
            return Err("logistic model has non-finite parameters".to_string());
        }
        Ok(Self {
            coefficients,
            intercept,
        })
    }

    fn probability(&self, row: &[f64]) -> f64 {
        let z: f64 = self
            .coefficients
            .iter()
            .zip(row)
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.intercept;
        sigmoid(z)
    }
}

impl Classifier for LogisticModel {
    fn kind(&self) -> &'static str {
        "logistic_regression"
    }

    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn n_classes(&self) -> usize {
        2
    }

    fn predict(&self, row: &[f64]) -> usize {
        usize::from(self.probability(row) > 0.5)
    }

    fn predict_proba(&self, row: &[f64]) -> Option<Vec<f64>> {
        let p = self.probability(row);
        Some(vec![1.0 - p, p])
    }
}

/// Numerically stable logistic function.
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}
