//! HTML rendering for the search and favorites pages

use crate::model::Product;
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use std::fmt::Write;

const STYLE: &str = r#"
body { font-family: -apple-system, "Malgun Gothic", sans-serif; margin: 2rem; color: #222; }
nav a { margin-right: 1rem; }
.flash { background: #eef6ee; border: 1px solid #9c9; padding: .5rem 1rem; margin: 1rem 0; }
table { border-collapse: collapse; width: 100%; margin-top: 1rem; }
th, td { border-bottom: 1px solid #ddd; padding: .4rem .6rem; text-align: left; font-size: .9rem; }
th { background: #f4f4f4; }
td.status { color: #b00; }
form.inline { display: inline; }
"#;

/// Form values echoed back into the search box
#[derive(Debug, Clone, Default)]
pub struct SearchInput<'a> {
    pub keywords: &'a str,
    pub pages: u32,
}

fn layout(title: &str, flash: Option<&str>, body: &str) -> String {
    let flash = flash
        .filter(|m| !m.is_empty())
        .map(|m| format!(r#"<p class="flash">{}</p>"#, text(m)))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="ko">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title} - product-watch</title>
<style>{STYLE}</style>
</head>
<body>
<nav><a href="/">Search</a><a href="/favorites">Favorites</a></nav>
<h1>{title}</h1>
{flash}
{body}
</body>
</html>
"#,
        title = text(title),
    )
}

/// Table of products with a checkbox per row, inside the form `form_id`
fn product_table(products: &[Product], form_id: &str) -> String {
    if products.is_empty() {
        return "<p>No products.</p>".to_string();
    }

    let mut html = String::from(
        "<table>\n<thead><tr><th></th><th>Brand</th><th>Name</th><th>Price</th><th>Benefit</th>\
         <th>Keyword</th><th>Code</th><th>Scraped</th><th>Updated</th><th>Status</th></tr></thead>\n<tbody>\n",
    );

    for product in products {
        let _ = writeln!(
            html,
            r#"<tr><td><input type="checkbox" name="select" value="{id}" form="{form}"></td><td>{brand}</td><td>{name}</td><td>{price}</td><td>{benefit}</td><td>{keyword}</td><td>{code}</td><td>{scraped}</td><td>{updated}</td><td class="status">{status}</td></tr>"#,
            id = product.id,
            form = attr(form_id),
            brand = text(&product.brand),
            name = text(&product.name),
            price = text(&product.price),
            benefit = text(&product.benefit),
            keyword = text(&product.keyword),
            code = text(&product.product_code),
            scraped = text(&product.scraped_at),
            updated = text(product.updated_at.as_deref().unwrap_or("")),
            status = text(product.status.as_deref().unwrap_or("")),
        );
    }

    html.push_str("</tbody>\n</table>\n");
    html
}

pub fn results_page(results: &[Product], input: &SearchInput<'_>, flash: Option<&str>) -> String {
    let mut body = format!(
        r#"<form method="post" action="/">
<label>Keywords (comma separated) <input type="text" name="keywords" value="{keywords}" size="40"></label>
<label>Pages <input type="number" name="pages" min="1" value="{pages}"></label>
<button type="submit">Search</button>
</form>
"#,
        keywords = attr(input.keywords),
        pages = input.pages.max(1),
    );

    let _ = write!(
        body,
        r#"<h2>Results ({count})</h2>
<form id="add-form" method="post" action="/favorites/add">
<button type="submit">Add selected to favorites</button>
</form>
"#,
        count = results.len(),
    );
    body.push_str(&product_table(results, "add-form"));

    layout("Search", flash, &body)
}

pub fn favorites_page(favorites: &[Product], flash: Option<&str>) -> String {
    let mut body = format!(
        r#"<p>{count} favorites</p>
<form id="favorites-form" method="post" action="/favorites/refresh" class="inline">
<button type="submit">Refresh selected</button>
<button type="submit" formaction="/favorites/remove">Remove selected</button>
</form>
<a href="/favorites/export">Export to Excel</a>
"#,
        count = favorites.len(),
    );
    body.push_str(&product_table(favorites, "favorites-form"));

    layout("Favorites", flash, &body)
}
