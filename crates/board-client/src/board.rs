use board_types::Value;

use crate::error::ClientError;
use crate::view::MessageView;
use crate::wallet::WalletProvider;

/// Submit `set-message`. Returns the transaction id; the message is only
/// visible to reads after the transaction is applied.
pub async fn set_message<W: WalletProvider>(wallet: &W, text: &str) -> Result<String, ClientError> {
    wallet.public_call("set-message", vec![Value::string(text)]).await
}

pub async fn clear_message<W: WalletProvider>(wallet: &W) -> Result<String, ClientError> {
    wallet.public_call("clear-message", Vec::new()).await
}

pub async fn get_message<W: WalletProvider>(
    wallet: &W,
    owner: &str,
) -> Result<MessageView, ClientError> {
    let resp = wallet
        .read_only_call("get-message", vec![Value::Principal(owner.to_string())])
        .await?;
    expect_okay("get-message", &resp)?;
    Ok(MessageView::from_read(&resp))
}

/// Needs a connected wallet: the caller is the connected principal.
pub async fn get_my_message<W: WalletProvider>(wallet: &W) -> Result<MessageView, ClientError> {
    if wallet.principal().is_none() {
        return Err(ClientError::NotConnected);
    }
    let resp = wallet.read_only_call("get-my-message", Vec::new()).await?;
    expect_okay("get-my-message", &resp)?;
    Ok(MessageView::from_read(&resp))
}

fn expect_okay(function: &str, resp: &board_types::api::ReadOnlyResponse) -> Result<(), ClientError> {
    if resp.okay {
        Ok(())
    } else {
        Err(ClientError::UnexpectedResult {
            function: function.to_string(),
            result: resp.result.clone(),
        })
    }
}
