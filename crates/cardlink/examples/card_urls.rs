//! Example: Render cards for a few live URLs
//!
//! Run with: cargo run -p cardlink --example card_urls
//!
//! Needs network access. Shows which fields each site provides.

use cardlink::{fetch_metadata, render_card, LinkMetadata};

struct Case {
    url: &'static str,
    description: &'static str,
    expect_title_contains: &'static str,
}

const CASES: &[Case] = &[
    Case {
        url: "https://example.com",
        description: "Bare page, <title> only",
        expect_title_contains: "Example Domain",
    },
    Case {
        url: "https://www.rust-lang.org",
        description: "Open Graph page",
        expect_title_contains: "Rust",
    },
    Case {
        url: "https://github.com/rust-lang/rust",
        description: "GitHub repository (uses GitHubRepoFetcher)",
        expect_title_contains: "rust-lang/rust",
    },
];

#[tokio::main]
async fn main() {
    println!("CardLink URL Examples");
    println!("=====================\n");

    let mut passed = 0;
    let mut failed = 0;

    for (i, case) in CASES.iter().enumerate() {
        println!("{}. {}", i + 1, case.description);
        println!("   URL: {}", case.url);

        match fetch_metadata(case.url).await {
            Ok(meta) => {
                print_summary(&meta);
                println!("{}", render_card(&meta));

                if meta.title.contains(case.expect_title_contains) {
                    println!("   ✓ PASS\n");
                    passed += 1;
                } else {
                    println!(
                        "   ✗ FAIL (expected title containing '{}')\n",
                        case.expect_title_contains
                    );
                    failed += 1;
                }
            }
            Err(e) => {
                println!("   Error: {}", e);
                println!("   ✗ FAIL\n");
                failed += 1;
            }
        }
    }

    println!("=====================");
    println!("Results: {} passed, {} failed", passed, failed);

    if failed > 0 {
        std::process::exit(1);
    }
}

fn print_summary(meta: &LinkMetadata) {
    println!("   Title: {}", meta.title);
    for (label, value) in [
        ("Description", &meta.description),
        ("Image", &meta.image),
        ("Favicon", &meta.favicon),
        ("Host", &meta.host),
    ] {
        if let Some(value) = value {
            println!("   {}: {}", label, value);
        }
    }
}
