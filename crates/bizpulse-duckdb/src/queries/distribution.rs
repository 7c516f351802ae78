use std::collections::HashMap;

use anyhow::Result;

use bizpulse_core::event::{Business, PaymentMethod};
use bizpulse_core::ranking::{self, DeliverySplit, DistributionSlice};

use crate::DuckDbBackend;

impl DuckDbBackend {
    /// All listings with payment methods decoded from their stored JSON
    /// form. One fetch feeds all three distribution views.
    pub(crate) async fn fetch_businesses(&self) -> Result<Vec<Business>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, name, category_id, payment_methods, delivery_available FROM businesses",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Business {
                id: row.get(0)?,
                name: row.get(1)?,
                category_id: row.get(2)?,
                payment_methods: PaymentMethod::parse_list(&row.get::<_, String>(3)?),
                delivery_available: row.get(4)?,
            })
        })?;

        let mut businesses = Vec::new();
        for row in rows {
            businesses.push(row?);
        }
        Ok(businesses)
    }

    pub(crate) async fn category_names(&self) -> Result<HashMap<String, String>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare("SELECT id, name FROM categories")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut names = HashMap::new();
        for row in rows {
            let (id, name) = row?;
            names.insert(id, name);
        }
        Ok(names)
    }

    /// Listings per category with names resolved from the reference table.
    pub async fn category_distribution(&self) -> Result<Vec<DistributionSlice>> {
        let businesses = self.fetch_businesses().await?;
        let categories = self.category_names().await?;
        Ok(ranking::category_distribution(&businesses, &categories))
    }

    /// Listings per payment method, fan-out counting (one increment per
    /// listed method).
    pub async fn payment_distribution(&self) -> Result<Vec<DistributionSlice>> {
        let businesses = self.fetch_businesses().await?;
        Ok(ranking::payment_distribution(&businesses))
    }

    /// Binary delivery partition; always sums to the listing total.
    pub async fn delivery_split(&self) -> Result<DeliverySplit> {
        let businesses = self.fetch_businesses().await?;
        Ok(ranking::delivery_split(&businesses))
    }
}
