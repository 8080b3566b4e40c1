use std::collections::HashMap;

use crate::models::{CatalogProduct, PriceSensitivity, SalesPoint};

const HISTORY_MONTHS: [&str; 16] = [
    "jul-24", "ago-24", "sept-24", "oct-24", "nov-24", "dic-24", "ene-25", "feb-25",
    "mar-25", "abr-25", "may-25", "jun-25", "jul-25", "ago-25", "sept-25", "oct-25",
];

/// Products available to the simulator together with their sales history.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<CatalogProduct>,
    history: HashMap<String, Vec<SalesPoint>>,
}

impl Catalog {
    pub fn new(products: Vec<CatalogProduct>, history: HashMap<String, Vec<SalesPoint>>) -> Self {
        Self { products, history }
    }

    /// Built-in demo data used until real uploads feed the simulator.
    pub fn demo() -> Self {
        let entries: [(&str, &str, &str, u32, u32, PriceSensitivity, u32, [u32; 16]); 4] = [
            (
                "OUR1000", "Producto Alpha", "Brasil", 60, 50, PriceSensitivity::Alta, 120,
                [78, 35, 39, 132, 122, 213, 51, 23, 144, 101, 282, 320, 50, 219, 179, 443],
            ),
            (
                "OUR2000", "Producto Beta", "Argentina", 45, 30, PriceSensitivity::Media, 80,
                [32, 53, 81, 88, 114, 59, 33, 105, 142, 31, 318, 111, 101, 65, 70, 173],
            ),
            (
                "OUR3000", "Producto Gamma", "Chile", 30, 40, PriceSensitivity::Baja, 200,
                [45, 67, 89, 112, 98, 156, 78, 92, 134, 121, 167, 189, 145, 156, 178, 145],
            ),
            (
                "OUR4000", "Producto Delta", "Perú", 50, 25, PriceSensitivity::Alta, 45,
                [89, 95, 102, 145, 167, 189, 92, 78, 134, 156, 201, 234, 167, 189, 212, 256],
            ),
        ];

        let mut products = Vec::with_capacity(entries.len());
        let mut history = HashMap::with_capacity(entries.len());
        for (code, name, country, lead_time, min_quantity, price_sensitivity, stock, sales) in entries {
            products.push(CatalogProduct {
                code: code.to_string(),
                name: name.to_string(),
                country: country.to_string(),
                lead_time,
                min_quantity,
                price_sensitivity,
                stock,
            });
            let points = HISTORY_MONTHS
                .iter()
                .zip(sales)
                .map(|(month, sales)| SalesPoint {
                    month: month.to_string(),
                    sales,
                })
                .collect();
            history.insert(code.to_string(), points);
        }

        Self::new(products, history)
    }

    pub fn products(&self) -> &[CatalogProduct] {
        &self.products
    }

    pub fn get(&self, code: &str) -> Option<&CatalogProduct> {
        self.products.iter().find(|p| p.code == code)
    }

    pub fn history(&self, code: &str) -> &[SalesPoint] {
        self.history.get(code).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Case-insensitive match on code or name; a blank query returns everything.
    pub fn search(&self, query: &str) -> Vec<&CatalogProduct> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self.products.iter().collect();
        }
        self.products
            .iter()
            .filter(|p| {
                p.code.to_lowercase().contains(&query) || p.name.to_lowercase().contains(&query)
            })
            .collect()
    }
}

/// Ordered set of product codes picked for a simulation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    codes: Vec<String>,
}

impl Selection {
    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    pub fn is_selected(&self, code: &str) -> bool {
        self.codes.iter().any(|c| c == code)
    }

    pub fn toggle(&mut self, code: &str) {
        if self.is_selected(code) {
            self.codes.retain(|c| c != code);
        } else {
            self.codes.push(code.to_string());
        }
    }

    /// Deselects every visible code if all of them are selected, otherwise
    /// selects all visible codes without duplicating any.
    pub fn toggle_all(&mut self, visible: &[&str]) {
        let all_selected = visible.iter().all(|code| self.is_selected(code));
        self.codes.retain(|c| !visible.contains(&c.as_str()));
        if !all_selected {
            self.codes.extend(visible.iter().map(|c| c.to_string()));
        }
    }

    /// Drops selections that are no longer visible.
    pub fn retain_visible(&mut self, visible: &[&str]) {
        self.codes.retain(|c| visible.contains(&c.as_str()));
    }

    pub fn visible_count(&self, visible: &[&str]) -> usize {
        self.codes
            .iter()
            .filter(|c| visible.contains(&c.as_str()))
            .count()
    }

    pub fn clear(&mut self) {
        self.codes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_catalog() {
        let catalog = Catalog::demo();
        assert_eq!(catalog.products().len(), 4);
        let delta = catalog.get("OUR4000").unwrap();
        assert_eq!(delta.stock, 45);
        let history = catalog.history("OUR1000");
        assert_eq!(history.len(), 16);
        assert_eq!(history.last().unwrap().month, "oct-25");
        assert_eq!(history.last().unwrap().sales, 443);
        assert!(catalog.history("NOPE").is_empty());
    }

    #[test]
    fn test_search() {
        let catalog = Catalog::demo();
        assert_eq!(catalog.search("  ").len(), 4);
        let hits = catalog.search("gamma");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].code, "OUR3000");
        assert_eq!(catalog.search("our2").len(), 1);
        assert!(catalog.search("zeta").is_empty());
    }

    #[test]
    fn test_toggle() {
        let mut selection = Selection::default();
        selection.toggle("OUR1000");
        selection.toggle("OUR2000");
        selection.toggle("OUR1000");
        assert_eq!(selection.codes(), &["OUR2000".to_string()]);
    }

    #[test]
    fn test_toggle_all() {
        let mut selection = Selection::default();
        selection.toggle("OUR4000");
        selection.toggle("OUR1000");

        selection.toggle_all(&["OUR1000", "OUR2000"]);
        assert_eq!(selection.codes(), &["OUR4000", "OUR1000", "OUR2000"]);

        selection.toggle_all(&["OUR1000", "OUR2000"]);
        assert_eq!(selection.codes(), &["OUR4000"]);
    }

    #[test]
    fn test_visible_filtering() {
        let mut selection = Selection::default();
        selection.toggle("OUR1000");
        selection.toggle("OUR3000");
        assert_eq!(selection.visible_count(&["OUR3000"]), 1);
        selection.retain_visible(&["OUR3000"]);
        assert_eq!(selection.codes(), &["OUR3000"]);
        selection.clear();
        assert!(selection.codes().is_empty());
    }
}
