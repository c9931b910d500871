use url::Url;

use crate::output::ReplicationUrlData;

pub fn execute(url: &str, db: &str) -> anyhow::Result<ReplicationUrlData> {
	let base = Url::parse(url)?;
	let url = sgw::replication_url(&base, db)?;
	Ok(ReplicationUrlData { url: url.to_string() })
}
