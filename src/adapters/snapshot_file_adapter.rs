//! CSV portfolio snapshot adapter.
//!
//! Stands in for the brokerage-facing snapshot source: one
//! `<username>.csv` per user in the base directory, rows of
//! `instrument,name,current_price,portfolio_price,candle_1d,candle_1w,candle_1m`.

use crate::domain::error::LaddersimError;
use crate::domain::trigger::PositionSnapshot;
use crate::domain::user::User;
use crate::ports::snapshot_port::SnapshotPort;
use std::fs;
use std::path::PathBuf;

pub struct SnapshotFileAdapter {
    base_path: PathBuf,
}

impl SnapshotFileAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }
}

impl SnapshotPort for SnapshotFileAdapter {
    fn positions_for_user(&self, user: &User) -> Result<Vec<PositionSnapshot>, LaddersimError> {
        let path = self.base_path.join(format!("{}.csv", user.username));
        let content = fs::read_to_string(&path).map_err(|_| LaddersimError::NoData {
            instrument: path.display().to_string(),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut positions = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| LaddersimError::CandleData {
                reason: format!("snapshot parse error in {}: {e}", path.display()),
            })?;

            let text = |idx: usize, name: &str| -> Result<String, LaddersimError> {
                record
                    .get(idx)
                    .map(str::to_string)
                    .ok_or_else(|| LaddersimError::CandleData {
                        reason: format!("missing {name} column"),
                    })
            };
            let number = |idx: usize, name: &str| -> Result<f64, LaddersimError> {
                text(idx, name)?
                    .parse()
                    .map_err(|e| LaddersimError::CandleData {
                        reason: format!("invalid {name} value: {e}"),
                    })
            };

            positions.push(PositionSnapshot {
                instrument: text(0, "instrument")?,
                name: text(1, "name")?,
                current_price: number(2, "current_price")?,
                portfolio_price: number(3, "portfolio_price")?,
                daily_price: number(4, "candle_1d")?,
                weekly_price: number(5, "candle_1w")?,
                monthly_price: number(6, "candle_1m")?,
            });
        }
        Ok(positions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn user(username: &str) -> User {
        User {
            id: 1,
            username: username.to_string(),
            channel_id: "chat-1".to_string(),
            broker_token: "token-1".to_string(),
        }
    }

    #[test]
    fn reads_positions_for_user() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("alice.csv"),
            "instrument,name,current_price,portfolio_price,candle_1d,candle_1w,candle_1m\n\
             TSLA,Tesla Inc.,1000.0,900.0,950.0,920.0,800.0\n\
             GAZP,Gazprom,150.0,140.0,148.0,145.0,130.0\n",
        )
        .unwrap();
        let adapter = SnapshotFileAdapter::new(dir.path().to_path_buf());

        let positions = adapter.positions_for_user(&user("alice")).unwrap();
        assert_eq!(positions.len(), 2);
        assert_eq!(positions[0].instrument, "TSLA");
        assert_eq!(positions[0].name, "Tesla Inc.");
        assert!((positions[0].portfolio_price - 900.0).abs() < f64::EPSILON);
        assert!((positions[1].monthly_price - 130.0).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_file_is_no_data() {
        let dir = TempDir::new().unwrap();
        let adapter = SnapshotFileAdapter::new(dir.path().to_path_buf());
        let result = adapter.positions_for_user(&user("bob"));
        assert!(matches!(result, Err(LaddersimError::NoData { .. })));
    }
}
