use redb::TableDefinition;

/// Session slot: SESSION_KEY -> StoredSnapshot (MessagePack)
pub const SESSION_SLOT: TableDefinition<&str, &[u8]> = TableDefinition::new("session_slot");

/// The only key ever written to [`SESSION_SLOT`]
pub const SESSION_KEY: &str = "userData";
