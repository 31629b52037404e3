//! Spreadsheet export of favorites

use crate::error::Result;
use crate::model::Product;
use indexmap::IndexSet;
use rust_xlsxwriter::{Format, Workbook};

pub const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const EXPORT_FILE_NAME: &str = "favorites.xlsx";

const SHEET_NAME: &str = "favorites";

/// Header row plus one row of cells per product
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportTable {
    /// Every field name observed across the products, in first-seen order
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ExportTable {
    pub fn from_products(products: &[Product]) -> Self {
        let fields: Vec<_> = products.iter().map(Product::fields).collect();

        let headers: IndexSet<String> = fields.iter().flat_map(|f| f.keys().cloned()).collect();
        let rows = fields
            .iter()
            .map(|f| headers.iter().map(|h| f.get(h).cloned().unwrap_or_default()).collect())
            .collect();

        Self { headers: headers.into_iter().collect(), rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Render `products` as an `.xlsx` workbook; `None` when there is nothing to export
pub fn favorites_workbook(products: &[Product]) -> Result<Option<Vec<u8>>> {
    let table = ExportTable::from_products(products);
    if table.is_empty() {
        return Ok(None);
    }
    Ok(Some(to_xlsx(&table)?))
}

pub fn to_xlsx(table: &ExportTable) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, header) in table.headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, header, &header_format)?;
    }
    for (row, cells) in table.rows.iter().enumerate() {
        for (col, cell) in cells.iter().enumerate() {
            worksheet.write_string(row as u32 + 1, col as u16, cell)?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(name: &str, price: &str) -> Product {
        let mut product = Product::new("앰플", "2024-05-01 10:00:00");
        product.brand = "아누아".to_string();
        product.name = name.to_string();
        product.price = price.to_string();
        product.product_code = "A000000200000".to_string();
        product
    }

    #[test]
    fn test_empty_favorites_produce_no_file() {
        assert!(favorites_workbook(&[]).unwrap().is_none());
    }

    #[test]
    fn test_table_has_one_row_per_product() {
        let table = ExportTable::from_products(&[product("a", "1"), product("b", "2"), product("c", "3")]);
        assert_eq!(table.rows.len(), 3);
        assert!(table.rows.iter().all(|r| r.len() == table.headers.len()));
        assert_eq!(
            table.headers,
            vec!["brand", "name", "price", "benefit", "keyword", "product_code", "scraped_at"]
        );
        assert_eq!(table.rows[1][1], "b");
    }

    #[test]
    fn test_headers_are_union_of_observed_fields() {
        let plain = product("a", "1");
        let mut refreshed = product("b", "2");
        refreshed.updated_at = Some("2024-05-02 09:00:00".to_string());
        let mut failed = product("c", "3");
        failed.status = Some("Navigation failed".to_string());

        let table = ExportTable::from_products(&[plain, refreshed, failed]);
        assert_eq!(&table.headers[7..], ["updated_at", "status"]);
        assert_eq!(table.rows[0][7], "");
        assert_eq!(table.rows[1][7], "2024-05-02 09:00:00");
        assert_eq!(table.rows[2][8], "Navigation failed");
    }

    #[test]
    fn test_workbook_is_zip_container() {
        let bytes = favorites_workbook(&[product("어성초 77 토너", "15,000")]).unwrap().unwrap();
        assert!(bytes.len() > 100);
        assert_eq!(&bytes[..2], b"PK");
    }
}
