//! Interactive confirmation in front of the local signer.

use std::io::{self, BufRead, Write};

use async_trait::async_trait;

use cipherscore_protocol::{
    ChallengeSignature, ChallengeSigner, LocalKeySigner, ProtocolError, Result,
};

/// Shows the challenge on stderr and signs only after the user agrees.
#[derive(Debug)]
pub struct PromptSigner {
    key: LocalKeySigner,
    auto_confirm: bool,
}

impl PromptSigner {
    pub fn new(key: LocalKeySigner, auto_confirm: bool) -> Self {
        Self { key, auto_confirm }
    }
}

/// `y` or `yes`, any case.
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn ask(challenge: &str) -> io::Result<String> {
    let mut stderr = io::stderr().lock();
    writeln!(stderr, "Sign the following message to reveal the score:\n")?;
    writeln!(stderr, "{}\n", challenge)?;
    write!(stderr, "Sign? [y/N] ")?;
    stderr.flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(answer)
}

#[async_trait]
impl ChallengeSigner for PromptSigner {
    async fn sign(&self, challenge: &str) -> Result<ChallengeSignature> {
        if !self.auto_confirm {
            let owned = challenge.to_string();
            let answer = tokio::task::spawn_blocking(move || ask(&owned))
                .await
                .map_err(|e| ProtocolError::Transport(e.to_string()))?
                .map_err(|e| ProtocolError::Transport(e.to_string()))?;

            if !is_affirmative(&answer) {
                return Err(ProtocolError::UserRejected);
            }
        }
        Ok(self.key.sign_challenge(challenge))
    }
}
