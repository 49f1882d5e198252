//! SeaORM entity models
//!
//! Tables of the webtrees schema, `wt_` prefix included.

mod tree;
mod tree_setting;
mod user_setting;
mod user_tree_setting;
mod individual;
mod family;
mod source;
mod media;
mod other;
mod link;
mod block;
mod block_setting;
mod default_resn;

pub use tree::{
    Entity as TreeEntity,
    Model as TreeRow,
    ActiveModel as TreeActiveModel,
    Column as TreeColumn,
};

pub use tree_setting::{
    Entity as TreeSettingEntity,
    Model as TreeSetting,
    ActiveModel as TreeSettingActiveModel,
    Column as TreeSettingColumn,
};

pub use user_setting::{
    Entity as UserSettingEntity,
    Model as UserSetting,
    ActiveModel as UserSettingActiveModel,
    Column as UserSettingColumn,
};

pub use user_tree_setting::{
    Entity as UserTreeSettingEntity,
    Model as UserTreeSetting,
    ActiveModel as UserTreeSettingActiveModel,
    Column as UserTreeSettingColumn,
};

pub use individual::{
    Entity as IndividualEntity,
    Model as IndividualRow,
    ActiveModel as IndividualActiveModel,
    Column as IndividualColumn,
};

pub use family::{
    Entity as FamilyEntity,
    Model as FamilyRow,
    ActiveModel as FamilyActiveModel,
    Column as FamilyColumn,
};

pub use source::{
    Entity as SourceEntity,
    Model as SourceRow,
    ActiveModel as SourceActiveModel,
    Column as SourceColumn,
};

pub use media::{
    Entity as MediaEntity,
    Model as MediaRow,
    ActiveModel as MediaActiveModel,
    Column as MediaColumn,
};

pub use other::{
    Entity as OtherEntity,
    Model as OtherRow,
    ActiveModel as OtherActiveModel,
    Column as OtherColumn,
};

pub use link::{
    Entity as LinkEntity,
    Model as Link,
    ActiveModel as LinkActiveModel,
    Column as LinkColumn,
};

pub use block::{
    Entity as BlockEntity,
    Model as BlockRow,
    ActiveModel as BlockActiveModel,
    Column as BlockColumn,
};

pub use block_setting::{
    Entity as BlockSettingEntity,
    Model as BlockSetting,
    ActiveModel as BlockSettingActiveModel,
    Column as BlockSettingColumn,
};

pub use default_resn::{
    Entity as DefaultResnEntity,
    Model as DefaultResn,
    ActiveModel as DefaultResnActiveModel,
    Column as DefaultResnColumn,
};
