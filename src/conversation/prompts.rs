//! Fixed prompt templates
//!
//! The exact texts the routine flows send upstream. This is deliberate
//! product copy; wording changes alter model behavior.

use crate::catalog::ProductSummary;

/// Persona prompt anchoring every conversation
pub const SYSTEM_PROMPT: &str = "You are a helpful beauty and skincare expert assistant. You provide advice on skincare routines, haircare, makeup, fragrance, and related beauty topics. You help users understand how to use their selected products effectively and answer questions about beauty and personal care. Keep your responses clear, concise, and complete.";

/// Fixed request appended when the user asks for the night routine
pub const NIGHT_ROUTINE_REQUEST: &str = "Now please provide the evening/night routine for the same products. Be clear, concise, and complete.";

/// What the user sees echoed for a night-routine request
pub const NIGHT_ROUTINE_DISPLAY: &str = "Please show me the evening/night routine.";

/// What the user sees echoed for a `continue` request
pub const CONTINUE_DISPLAY: &str = "Please continue...";

/// What actually goes upstream for a `continue` request
pub const CONTINUE_UPSTREAM: &str = "Please continue from where you left off.";

/// Build the morning-routine request from the selected products, listed as
/// numbered `brand name (category)` lines in selection order.
pub fn morning_routine_request(products: &[ProductSummary]) -> String {
    let listing = products
        .iter()
        .enumerate()
        .map(|(index, p)| format!("{}. {} {} ({})", index + 1, p.brand, p.name, p.category))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "I have selected the following beauty and skincare products. Please create a MORNING ROUTINE ONLY for me, explaining when and how to use each product:\n\n{listing}\n\nPlease provide ONLY the morning routine with step-by-step instructions. Be clear, concise, and complete. Do not include evening routine."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(brand: &str, name: &str, category: &str) -> ProductSummary {
        ProductSummary {
            name: name.to_string(),
            brand: brand.to_string(),
            category: category.to_string(),
            description: "...".to_string(),
        }
    }

    #[test]
    fn test_morning_request_numbers_products_in_order() {
        let request = morning_routine_request(&[
            summary("A", "Serum", "serum"),
            summary("B", "Cream", "moisturizer"),
        ]);

        assert!(request.contains("1. A Serum (serum)"));
        assert!(request.contains("2. B Cream (moisturizer)"));
        assert!(request.contains("MORNING ROUTINE ONLY"));
        assert!(request.contains("Do not include evening routine."));
    }

    #[test]
    fn test_continue_forms_differ() {
        assert_ne!(CONTINUE_DISPLAY, CONTINUE_UPSTREAM);
    }
}
