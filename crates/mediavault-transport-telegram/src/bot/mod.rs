/// Button press handling
pub mod callbacks;
/// Outbound send operations over the Bot API
pub mod gateway;
/// Command, media, reply and search message handlers
pub mod handlers;
/// View layer mapping keyboards onto Telegram markup
pub mod views;
