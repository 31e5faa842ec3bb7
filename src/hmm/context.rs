/// Viterbi work space for one sentence.
#[derive(Debug, Default)]
pub(crate) struct Trellis {
    /**
     * The total number of distinct tags (L).
     */
    num_tags: usize,

    /**
     * The number of items (T) in the sentence.
     */
    num_items: usize,

    /**
     * State scores.
     *  This is a [T][L] matrix whose element [t][l] presents the log
     *  emission probability of the word #t under tag #l.
     */
    pub state: Vec<f64>,

    /**
     * Best path scores.
     *  This is a [T][L] matrix whose element [t][l] presents the log
     *  probability of the best path starting at BOS and arriving at (t, l).
     */
    score: Vec<f64>,

    /**
     * Backward edges.
     *  This is a [T][L] matrix whose element [t][j] represents the tag #i
     *  that yields the maximum score to arrive at (t, j).
     */
    backward_edge: Vec<usize>,
}

impl Trellis {
    #[allow(non_snake_case)]
    pub fn new(L: usize, T: usize) -> Self {
        Self {
            num_tags: L,
            num_items: T,
            state: vec![0.0; T * L],
            score: vec![0.0; T * L],
            backward_edge: vec![0; T * L],
        }
    }

    #[inline]
    pub fn num_items(&self) -> usize {
        self.num_items
    }

    /// Fills the trellis and traces back the best path into `labels`.
    ///
    /// `start` is `[L]` and `trans` is `[L][L]`, both in the log domain, like
    /// the state scores. Ties keep the lowest tag id. Returns the score of the path.
    #[allow(non_snake_case)]
    pub fn viterbi(&mut self, start: &[f64], trans: &[f64], labels: &mut [usize]) -> f64 {
        let T = self.num_items;
        let L = self.num_tags;
        if T == 0 || L == 0 {
            return f64::NEG_INFINITY;
        }

        /* Compute the scores at (0, *). */
        for j in 0..L {
            self.score[j] = start[j] + self.state[j];
        }

        /* Compute the scores at (t, *). */
        for t in 1..T {
            for j in 0..L {
                let mut max_score = f64::NEG_INFINITY;
                let mut argmax = 0;
                for i in 0..L {
                    /* Transit from (t-1, i) to (t, j). */
                    let score = self.score[L * (t - 1) + i] + trans[L * i + j];
                    if max_score < score {
                        max_score = score;
                        argmax = i;
                    }
                }
                /* Backward link (#t, #j) -> (#t-1, #i). */
                self.backward_edge[L * t + j] = argmax;
                self.score[L * t + j] = max_score + self.state[L * t + j];
            }
        }

        /* Find the node (#T-1, #i) that reaches EOS with the maximum score. */
        let mut max_score = f64::NEG_INFINITY;
        labels[T - 1] = 0;
        for i in 0..L {
            let s = self.score[L * (T - 1) + i];
            if max_score < s {
                max_score = s;
                labels[T - 1] = i;
            }
        }

        /* Tag labels by tracing the backward links. */
        for t in (0..T - 1).rev() {
            labels[t] = self.backward_edge[L * (t + 1) + labels[t + 1]];
        }
        max_score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init() {
        let ctx = Trellis::new(9, 12);
        assert_eq!(ctx.num_items(), 12);
        assert_eq!(ctx.state.len(), 9 * 12);
    }

    #[test]
    fn follows_transitions() {
        // two tags, transitions strongly prefer alternating
        let start = [0.5f64.ln(), 0.5f64.ln()];
        let trans = [0.1f64.ln(), 0.9f64.ln(), 0.9f64.ln(), 0.1f64.ln()];
        let mut ctx = Trellis::new(2, 4);
        ctx.state[0] = 0.9f64.ln();
        ctx.state[1] = 0.1f64.ln();
        for t in 1..4 {
            ctx.state[2 * t] = 0.5f64.ln();
            ctx.state[2 * t + 1] = 0.5f64.ln();
        }
        let mut labels = vec![0; 4];
        let score = ctx.viterbi(&start, &trans, &mut labels);
        assert_eq!(labels, vec![0, 1, 0, 1]);
        let expected = 0.5f64.ln() + 0.9f64.ln() + 3.0 * (0.9f64.ln() + 0.5f64.ln());
        assert!((score - expected).abs() < 1e-12);
    }

    #[test]
    fn ties_pick_first_tag() {
        let uniform = [0.0; 3];
        let trans = [0.0; 9];
        let mut ctx = Trellis::new(3, 5);
        let mut labels = vec![9; 5];
        ctx.viterbi(&uniform, &trans, &mut labels);
        assert_eq!(labels, vec![0; 5]);
    }
}
