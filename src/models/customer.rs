use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// 客户引用 (外部客户档案的主键)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerRef(pub i64);

impl fmt::Display for CustomerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 客户档案 (customers)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub gstin: Option<String>,
}

impl Customer {
    pub fn reference(&self) -> CustomerRef {
        CustomerRef(self.id)
    }

    /// 下拉框显示文本: "名称 - 电话"
    pub fn display_label(&self) -> String {
        match self.phone.as_deref().filter(|p| !p.is_empty()) {
            Some(phone) => format!("{} - {}", self.name, phone),
            None => format!("{} - No Phone", self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_label() {
        let mut customer = Customer {
            id: 1,
            name: "Rajesh Electricals".to_string(),
            phone: Some("9876543210".to_string()),
            address: None,
            gstin: None,
        };
        assert_eq!(customer.display_label(), "Rajesh Electricals - 9876543210");

        customer.phone = Some(String::new());
        assert_eq!(customer.display_label(), "Rajesh Electricals - No Phone");
        assert_eq!(customer.reference(), CustomerRef(1));
    }
}
