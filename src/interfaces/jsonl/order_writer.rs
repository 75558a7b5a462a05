use crate::domain::order::Order;
use crate::error::Result;
use std::io::Write;

/// Writes orders as JSON lines, one serialized `Order` per line.
pub struct OrderWriter<W: Write> {
    sink: W,
}

impl<W: Write> OrderWriter<W> {
    pub fn new(sink: W) -> Self {
        Self { sink }
    }

    pub fn write_orders<'a>(&mut self, orders: impl IntoIterator<Item = &'a Order>) -> Result<()> {
        for order in orders {
            serde_json::to_writer(&mut self.sink, order)?;
            self.sink.write_all(b"\n")?;
        }
        self.sink.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::OrderId;
    use crate::domain::order::tests::draft;
    use chrono::Utc;

    #[test]
    fn test_writer_one_order_per_line() {
        let orders = vec![
            draft("alice").into_order(OrderId(2), Utc::now()).unwrap(),
            draft("bob").into_order(OrderId(1), Utc::now()).unwrap(),
        ];

        let mut out = Vec::new();
        OrderWriter::new(&mut out).write_orders(&orders).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: Order = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first, orders[0]);
    }
}
