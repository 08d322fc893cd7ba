use super::{require, ReviewService};
use crate::error::{ErrorDetails, ServiceError};
use crate::models::Team;
use crate::storage::{Storage, StorageTx};

impl<S: Storage> ReviewService<S> {
    /// Register a team together with its initial members
    pub async fn add_team(&self, team: Team) -> Result<Team, ErrorDetails> {
        self.run("add_team", async {
            require(&team.name, "team_name")?;
            if team.members.is_empty() {
                return Err(ServiceError::NotFound("empty members".into()));
            }
            for member in &team.members {
                require(&member.id, "user_id")?;
            }

            // Early exit only; the unique constraint decides under races
            if self.storage.select_team(&team.name).await?.is_some() {
                return Err(ServiceError::TeamExists);
            }

            let request = &team;
            self.in_transaction("add_team", move |mut tx| {
                let team = request.clone();
                Box::pin(async move {
                    let result = insert_team(&mut tx, &team).await;
                    (tx, result)
                })
            })
            .await?;

            tracing::info!(
                team_name = %team.name,
                members = team.members.len(),
                "Registered team"
            );
            self.storage
                .select_team(&team.name)
                .await?
                .ok_or_else(|| ServiceError::NotFound("team not found".into()))
        })
        .await
    }

    /// Team with its members
    pub async fn get_team(&self, team_name: &str) -> Result<Team, ErrorDetails> {
        self.run("get_team", async {
            require(team_name, "team_name")?;
            self.storage
                .select_team(team_name)
                .await?
                .ok_or_else(|| ServiceError::NotFound("team not found".into()))
        })
        .await
    }
}

async fn insert_team<T: StorageTx>(tx: &mut T, team: &Team) -> Result<(), ServiceError> {
    tx.insert_team(&team.name).await?;
    for member in &team.members {
        tx.insert_team_member(&team.name, member).await?;
    }
    Ok(())
}
