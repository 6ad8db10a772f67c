use crate::models::TokenUsage;

/// Per-token prices, quoted per million tokens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateTable {
    pub input_per_million: f64,
    pub output_per_million: f64,
    pub cache_creation_per_million: f64,
}

impl Default for RateTable {
    fn default() -> Self {
        // Sonnet-class list prices
        Self {
            input_per_million: 3.0,
            output_per_million: 15.0,
            cache_creation_per_million: 3.75,
        }
    }
}

impl RateTable {
    pub fn cost(&self, tokens: &TokenUsage) -> f64 {
        let input_cost = tokens.input_tokens as f64 * self.input_per_million;
        let output_cost = tokens.output_tokens as f64 * self.output_per_million;
        let cache_creation_cost =
            tokens.cache_creation_input_tokens as f64 * self.cache_creation_per_million;

        (input_cost + output_cost + cache_creation_cost) / 1_000_000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_million_input_tokens_cost_three_dollars() {
        let tokens = TokenUsage {
            input_tokens: 1_000_000,
            ..Default::default()
        };
        assert_eq!(RateTable::default().cost(&tokens), 3.0);
    }

    #[test]
    fn mixes_all_token_classes() {
        let tokens = TokenUsage {
            input_tokens: 1_000_000,
            output_tokens: 1_000_000,
            cache_creation_input_tokens: 1_000_000,
        };
        assert!((RateTable::default().cost(&tokens) - 21.75).abs() < 1e-9);
    }
}
