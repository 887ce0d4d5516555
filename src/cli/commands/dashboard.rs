use serde_json::{json, Value};

use crate::cli::client::ApiClient;
use crate::cli::commands::resources::Resource;
use crate::cli::config::ConfigStore;
use crate::cli::utils::output_record;
use crate::cli::OutputFormat;

/// Record counts for the landing page, as seen by the logged-in user.
pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let config = ConfigStore::open()?;
    let client = ApiClient::authenticated(&config)?;

    let (users, applications, links, departments) = tokio::try_join!(
        client.get(Resource::USERS.path),
        client.get(Resource::APPLICATIONS.path),
        client.get(Resource::LINKS.path),
        client.get(Resource::DEPARTMENTS.path),
    )?;

    let summary = summarize(&users, &applications, &links, &departments);
    output_record(&output_format, &summary)
}

fn summarize(users: &Value, applications: &Value, links: &Value, departments: &Value) -> Value {
    json!({
        "users": count(users),
        "applications": count(applications),
        "links": count(links),
        "departments": count(departments),
    })
}

fn count(list: &Value) -> usize {
    list.as_array().map_or(0, Vec::len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_each_list() {
        let summary = summarize(
            &json!([{"id": 2}, {"id": 1}]),
            &json!([{"id": 7}]),
            &json!([]),
            &json!([{"id": 1}, {"id": 2}, {"id": 3}]),
        );
        assert_eq!(summary["users"], 2);
        assert_eq!(summary["applications"], 1);
        assert_eq!(summary["links"], 0);
        assert_eq!(summary["departments"], 3);
    }

    #[test]
    fn non_list_counts_as_empty() {
        assert_eq!(count(&Value::Null), 0);
        assert_eq!(count(&json!({"id": 1})), 0);
    }
}
