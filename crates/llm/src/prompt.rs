//! Prompt construction.

use std::fmt::Write as _;

use pipeline::{Category, RawPost, TrackedAccount};

/// Longest post text included verbatim; longer posts are cut.
const MAX_POST_CHARS: usize = 2_000;

/// Builds the categorization prompt for one account's posts.
pub fn build(account: &TrackedAccount, posts: &[RawPost]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Analyze the following recent posts from the company \"{}\" and extract \
         business intelligence a competitor would care about.",
        account.display_name
    );
    out.push_str(
        "\nReturn ONLY a JSON object, no markdown and no extra text. Each key is a \
         category and each value is a list of findings:\n\n{\n",
    );
    for (i, category) in Category::ALL.iter().enumerate() {
        let comma = if i + 1 < Category::ALL.len() { "," } else { "" };
        let _ = writeln!(
            out,
            "  \"{}\": [{{\"description\": \"{}\", \"url\": \"post URL\"}}]{comma}",
            category.key(),
            guidance(*category)
        );
    }
    out.push_str(
        "}\n\nRules:\n\
         - Only include categories that have actual information.\n\
         - Keep each description to one concise sentence.\n\
         - Use the exact URL of the post the finding comes from.\n\
         - Skip routine marketing, event promotion and reposts.\n\
         - Add \"critical\": true to findings about funding rounds or investment, \
         acquisitions (buying or being acquired), major revenue milestones, or an \
         IPO or exit. Omit the field otherwise.\n\
         - If nothing is significant, return an empty object: {}\n\
         \nPosts:\n",
    );
    for (i, post) in posts.iter().enumerate() {
        let _ = write!(
            out,
            "\nPost {}:\n{}\nURL: {}\n",
            i + 1,
            clip(post.text.trim()),
            post.url
        );
    }
    out
}

fn guidance(category: Category) -> &'static str {
    match category {
        Category::FundRaise => "funding announcement",
        Category::Hiring => "key hires or leadership changes",
        Category::CustomerSuccess => "customer wins or case studies",
        Category::Product => "product launches or major features",
        Category::Partnerships => "partnerships or integrations",
        Category::GoToMarket => "new markets, pricing or sales motions",
        Category::Other => "other significant company news",
    }
}

fn clip(text: &str) -> &str {
    match text.char_indices().nth(MAX_POST_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipeline::{AccountId, PostId};

    fn post(n: u32, text: &str) -> RawPost {
        RawPost {
            id: PostId::new(n.to_string()).unwrap(),
            account: AccountId::new("sierra").unwrap(),
            text: text.into(),
            url: format!("https://x.com/sierra/status/{n}"),
            posted_at: None,
        }
    }

    #[test]
    fn lists_every_category_and_post() {
        let account = TrackedAccount::new(AccountId::new("sierra").unwrap(), "Sierra");
        let prompt = build(
            &account,
            &[post(1, "We raised $175M"), post(2, "Meet our new CTO")],
        );

        assert!(prompt.contains("\"Sierra\""));
        for category in Category::ALL {
            assert!(prompt.contains(&format!("\"{}\"", category.key())));
        }
        assert!(prompt.contains("Post 1:\nWe raised $175M\nURL: https://x.com/sierra/status/1"));
        assert!(prompt.contains("Post 2:\nMeet our new CTO"));
    }

    #[test]
    fn long_posts_are_clipped() {
        let long = "a".repeat(MAX_POST_CHARS + 50);
        assert_eq!(clip(&long).len(), MAX_POST_CHARS);
        assert_eq!(clip("short"), "short");
    }
}
