use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::doc;
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument};
use mongodb::{Collection, bson::Document, error::Result};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub enum OrderType {
    #[default]
    Asc,
    Desc,
}

impl OrderType {
    fn direction(self) -> i32 {
        match self {
            OrderType::Asc => 1,
            OrderType::Desc => -1,
        }
    }
}

#[async_trait]
pub trait Repository<T> {
    async fn find_by_id(&self, id: &str) -> Result<Option<T>>;
    async fn insert(&self, entity: &T) -> Result<()>;
    async fn find_one(&self, filter: Document) -> Result<Option<T>>;
    async fn query_all(&self) -> Result<Vec<T>>;
    async fn query_sorted(&self, filter: Document, sort_field: &str, order: OrderType) -> Result<Vec<T>>;
    /// 按 `_id` 原子更新并返回更新后的文档；文档不存在时返回 None
    async fn update_by_id(&self, id: &str, update: Document) -> Result<Option<T>>;
    /// 按 `_id` 删除，返回删除条数
    async fn delete_by_id(&self, id: &str) -> Result<u64>;
}

#[derive(Debug)]
pub struct BaseRepository<T: Send + Sync> {
    pub collection: Collection<T>,
}

impl<T: Send + Sync> BaseRepository<T> {
    pub fn new(collection: Collection<T>) -> Self {
        Self { collection }
    }
}

#[async_trait]
impl<T: Send + Sync> Repository<T> for BaseRepository<T>
where
    T: Serialize + DeserializeOwned + Unpin + Send + Sync,
{
    async fn find_by_id(&self, id: &str) -> Result<Option<T>> {
        self.find_one(doc! { "_id": id }).await
    }

    async fn insert(&self, entity: &T) -> Result<()> {
        self.collection.insert_one(entity).await?;
        Ok(())
    }

    async fn find_one(&self, filter: Document) -> Result<Option<T>> {
        let result = self.collection.find_one(filter).await?;
        Ok(result)
    }

    async fn query_all(&self) -> Result<Vec<T>> {
        let mut cursor = self.collection.find(doc! {}).await?;
        let mut result = vec![];
        while let Some(doc) = cursor.try_next().await? {
            result.push(doc);
        }
        Ok(result)
    }

    async fn query_sorted(&self, filter: Document, sort_field: &str, order: OrderType) -> Result<Vec<T>> {
        let find_options = FindOptions::builder().sort(doc! { sort_field: order.direction() }).build();
        let mut cursor = self.collection.find(filter).with_options(find_options).await?;
        let mut results: Vec<T> = vec![];
        while let Some(doc) = cursor.try_next().await? {
            results.push(doc);
        }
        Ok(results)
    }

    async fn update_by_id(&self, id: &str, update: Document) -> Result<Option<T>> {
        let options = FindOneAndUpdateOptions::builder().return_document(ReturnDocument::After).build();
        let updated = self.collection.find_one_and_update(doc! { "_id": id }, update).with_options(options).await?;
        Ok(updated)
    }

    async fn delete_by_id(&self, id: &str) -> Result<u64> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count)
    }
}
