//! Default system prompts bundled at compile time, one per template.

/// Product/landing pages - the default when no keyword matches.
pub const LANDING: &str = include_str!("defaults/landing.md");

/// Personal portfolio sites.
pub const PORTFOLIO: &str = include_str!("defaults/portfolio.md");

/// Restaurants, cafes, bakeries.
pub const RESTAURANT: &str = include_str!("defaults/restaurant.md");

/// Online stores and product shops.
pub const STORE: &str = include_str!("defaults/store.md");

/// Blogs and magazines.
pub const BLOG: &str = include_str!("defaults/blog.md");

#[cfg(test)]
mod tests {
    #[test]
    fn all_prompts_are_nonempty() {
        for prompt in [
            super::LANDING,
            super::PORTFOLIO,
            super::RESTAURANT,
            super::STORE,
            super::BLOG,
        ] {
            assert!(prompt.contains("web designer"), "missing persona: {prompt}");
        }
    }
}
